//! Approval workflow models
//! 审批流核心：门禁顺序、状态机与角色权限的纯推导层

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::UserRole;

/// 审批门禁（顺序固定，文章必须依次通过）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "approval_gate", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApprovalGate {
    Marketing,
    Branding,
    SocL1,
    SocL3,
    Ciso,
}

/// 门禁顺序表，审批只能按此顺序逐级推进
pub const GATE_ORDER: [ApprovalGate; 5] = [
    ApprovalGate::Marketing,
    ApprovalGate::Branding,
    ApprovalGate::SocL1,
    ApprovalGate::SocL3,
    ApprovalGate::Ciso,
];

impl ApprovalGate {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalGate::Marketing => "marketing",
            ApprovalGate::Branding => "branding",
            ApprovalGate::SocL1 => "soc_l1",
            ApprovalGate::SocL3 => "soc_l3",
            ApprovalGate::Ciso => "ciso",
        }
    }

    /// 该门禁对应的待审状态
    pub fn pending_status(&self) -> ApprovalStatus {
        match self {
            ApprovalGate::Marketing => ApprovalStatus::PendingMarketing,
            ApprovalGate::Branding => ApprovalStatus::PendingBranding,
            ApprovalGate::SocL1 => ApprovalStatus::PendingSocL1,
            ApprovalGate::SocL3 => ApprovalStatus::PendingSocL3,
            ApprovalGate::Ciso => ApprovalStatus::PendingCiso,
        }
    }
}

/// 文章审批状态（互斥标签，唯一决定当前待审门禁）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "approval_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    PendingMarketing,
    PendingBranding,
    PendingSocL1,
    PendingSocL3,
    PendingCiso,
    Approved,
    Rejected,
    Released,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::PendingMarketing => "pending_marketing",
            ApprovalStatus::PendingBranding => "pending_branding",
            ApprovalStatus::PendingSocL1 => "pending_soc_l1",
            ApprovalStatus::PendingSocL3 => "pending_soc_l3",
            ApprovalStatus::PendingCiso => "pending_ciso",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
            ApprovalStatus::Released => "released",
        }
    }

    /// 当前门禁批准后的下一个状态
    ///
    /// 待审状态沿门禁顺序推进，最后一道门禁（CISO）批准后进入
    /// `Approved`；终态不再自动推进，返回 `None`。
    pub fn next_on_approve(&self) -> Option<ApprovalStatus> {
        match self {
            ApprovalStatus::PendingMarketing => Some(ApprovalStatus::PendingBranding),
            ApprovalStatus::PendingBranding => Some(ApprovalStatus::PendingSocL1),
            ApprovalStatus::PendingSocL1 => Some(ApprovalStatus::PendingSocL3),
            ApprovalStatus::PendingSocL3 => Some(ApprovalStatus::PendingCiso),
            ApprovalStatus::PendingCiso => Some(ApprovalStatus::Approved),
            ApprovalStatus::Approved
            | ApprovalStatus::Rejected
            | ApprovalStatus::Released => None,
        }
    }

    /// 该状态对应的待审门禁；非待审状态没有门禁
    pub fn required_gate(&self) -> Option<ApprovalGate> {
        match self {
            ApprovalStatus::PendingMarketing => Some(ApprovalGate::Marketing),
            ApprovalStatus::PendingBranding => Some(ApprovalGate::Branding),
            ApprovalStatus::PendingSocL1 => Some(ApprovalGate::SocL1),
            ApprovalStatus::PendingSocL3 => Some(ApprovalGate::SocL3),
            ApprovalStatus::PendingCiso => Some(ApprovalGate::Ciso),
            ApprovalStatus::Approved
            | ApprovalStatus::Rejected
            | ApprovalStatus::Released => None,
        }
    }

    /// 待审判定保持字符串前缀检查，队列过滤逻辑依赖这一语义
    pub fn is_pending(&self) -> bool {
        self.as_str().starts_with("pending_")
    }

    pub fn is_ready_for_release(&self) -> bool {
        matches!(self, ApprovalStatus::Approved)
    }

    pub fn is_released(&self) -> bool {
        matches!(self, ApprovalStatus::Released)
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, ApprovalStatus::Rejected)
    }
}

/// 判断状态迁移是否合法
///
/// 允许的迁移：
/// - 任一待审状态 -> rejected（驳回）
/// - rejected -> pending_marketing（管理员重置）
/// - approved -> released（发布）
/// - 待审状态 -> 门禁顺序上的下一个状态
pub fn transition_valid(from: ApprovalStatus, to: ApprovalStatus) -> bool {
    if to == ApprovalStatus::Rejected {
        return from.is_pending();
    }

    if to == ApprovalStatus::PendingMarketing {
        return from == ApprovalStatus::Rejected;
    }

    if to == ApprovalStatus::Released {
        return from == ApprovalStatus::Approved;
    }

    from.next_on_approve() == Some(to)
}

impl UserRole {
    /// 审阅角色负责的门禁；admin/super_admin 不绑定单一门禁
    pub fn target_gate(&self) -> Option<ApprovalGate> {
        match self {
            UserRole::Marketing => Some(ApprovalGate::Marketing),
            UserRole::Branding => Some(ApprovalGate::Branding),
            UserRole::SocLevel1 => Some(ApprovalGate::SocL1),
            UserRole::SocLevel3 => Some(ApprovalGate::SocL3),
            UserRole::Ciso => Some(ApprovalGate::Ciso),
            UserRole::User | UserRole::Admin | UserRole::SuperAdmin => None,
        }
    }

    /// 角色是否可以审批指定门禁
    ///
    /// admin/super_admin 无条件通过；其余角色仅限自己负责的门禁。
    /// 仅用于决定动作是否可见可用，权威校验在服务层按文章状态执行。
    pub fn can_approve_gate(&self, gate: ApprovalGate) -> bool {
        if matches!(self, UserRole::Admin | UserRole::SuperAdmin) {
            return true;
        }
        self.target_gate() == Some(gate)
    }

    /// 是否可以发布已通过全部门禁的文章
    pub fn can_release(&self) -> bool {
        matches!(self, UserRole::Ciso | UserRole::Admin | UserRole::SuperAdmin)
    }

    /// 是否可以将已驳回文章重置回流程起点
    pub fn can_reset(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::SuperAdmin)
    }

    /// 角色是否可以对处于该状态的文章执行审批动作
    pub fn can_approve_status(&self, status: ApprovalStatus) -> bool {
        match status.required_gate() {
            Some(gate) => self.can_approve_gate(gate),
            None => false,
        }
    }
}

/// 单个门禁的审批记录（不可变审计事实，由服务端在批准时写入）
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ArticleApproval {
    pub id: Uuid,
    pub article_id: Uuid,
    pub gate: ApprovalGate,
    pub approved_by: Uuid,
    pub approved_at: DateTime<Utc>,
    pub notes: Option<String>,

    // 来自 users 表的联查字段
    pub approver_name: Option<String>,
    pub approver_email: Option<String>,
}

/// 驳回详情（终态事件，与后续门禁推进互斥）
#[derive(Debug, Clone, Serialize)]
pub struct RejectionDetails {
    pub reason: String,
    pub rejected_by: Uuid,
    pub rejector_name: Option<String>,
    pub rejected_at: DateTime<Utc>,
}

/// 发布详情
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseDetails {
    pub released_by: Uuid,
    pub releaser_name: Option<String>,
    pub released_at: DateTime<Utc>,
}

/// 批准请求（备注可选）
#[derive(Debug, Deserialize, validator::Validate)]
pub struct ApproveArticleRequest {
    #[validate(length(max = 1000, message = "notes must not exceed 1000 characters"))]
    pub notes: Option<String>,
}

/// 驳回请求，理由必填且长度受限
#[derive(Debug, Deserialize, validator::Validate)]
pub struct RejectArticleRequest {
    #[validate(length(
        min = 10,
        max = 2000,
        message = "rejection reason must be between 10 and 2000 characters"
    ))]
    pub reason: String,
}

/// 审批进度（派生数据，不落库）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApprovalProgress {
    pub completed_gates: Vec<ApprovalGate>,
    pub current_gate: Option<ApprovalGate>,
    pub pending_gates: Vec<ApprovalGate>,
    pub total_gates: usize,
    pub completed_count: usize,
}

impl ApprovalProgress {
    /// 根据状态与已有审批记录构建进度
    ///
    /// 已完成门禁必须是 GATE_ORDER 的前缀：按顺序遍历，遇到第一个
    /// 未批准的门禁即停止计入，跳序写入的记录不被采信。
    pub fn build(status: ApprovalStatus, approvals: &[ArticleApproval]) -> Self {
        let mut completed_gates = Vec::new();
        let mut pending_gates = Vec::new();
        let mut current_gate = None;
        let mut prefix_broken = false;

        for gate in GATE_ORDER {
            let approved = !prefix_broken && approvals.iter().any(|a| a.gate == gate);

            if approved {
                completed_gates.push(gate);
            } else {
                prefix_broken = true;
                if current_gate.is_none() && status.is_pending() {
                    current_gate = Some(gate);
                } else {
                    pending_gates.push(gate);
                }
            }
        }

        let completed_count = completed_gates.len();
        Self {
            completed_gates,
            current_gate,
            pending_gates,
            total_gates: GATE_ORDER.len(),
            completed_count,
        }
    }

    /// 完成百分比（四舍五入到整数；total 为 0 时返回 0，不崩溃）
    pub fn percentage(&self) -> u8 {
        if self.total_gates == 0 {
            return 0;
        }
        ((self.completed_count as f64 / self.total_gates as f64) * 100.0).round() as u8
    }
}

/// 审批历史响应（含派生进度与终态详情）
#[derive(Debug, Serialize)]
pub struct ApprovalHistoryResponse {
    pub article_id: Uuid,
    pub approval_status: ApprovalStatus,
    pub approvals: Vec<ArticleApproval>,
    pub progress: ApprovalProgress,
    pub progress_percentage: u8,
    pub rejection: Option<RejectionDetails>,
    pub release: Option<ReleaseDetails>,
}

/// 队列响应的元信息
#[derive(Debug, Serialize)]
pub struct QueueMeta {
    pub role: UserRole,
    pub target_gate: Option<ApprovalGate>,
    pub total_pending: i64,
}

/// 按状态的统计行
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct StatusCount {
    pub status: ApprovalStatus,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approval(gate: ApprovalGate) -> ArticleApproval {
        ArticleApproval {
            id: Uuid::new_v4(),
            article_id: Uuid::new_v4(),
            gate,
            approved_by: Uuid::new_v4(),
            approved_at: Utc::now(),
            notes: None,
            approver_name: None,
            approver_email: None,
        }
    }

    #[test]
    fn test_next_on_approve_chain() {
        assert_eq!(
            ApprovalStatus::PendingMarketing.next_on_approve(),
            Some(ApprovalStatus::PendingBranding)
        );
        assert_eq!(
            ApprovalStatus::PendingBranding.next_on_approve(),
            Some(ApprovalStatus::PendingSocL1)
        );
        assert_eq!(
            ApprovalStatus::PendingSocL1.next_on_approve(),
            Some(ApprovalStatus::PendingSocL3)
        );
        assert_eq!(
            ApprovalStatus::PendingSocL3.next_on_approve(),
            Some(ApprovalStatus::PendingCiso)
        );
        assert_eq!(
            ApprovalStatus::PendingCiso.next_on_approve(),
            Some(ApprovalStatus::Approved)
        );

        assert_eq!(ApprovalStatus::Approved.next_on_approve(), None);
        assert_eq!(ApprovalStatus::Rejected.next_on_approve(), None);
        assert_eq!(ApprovalStatus::Released.next_on_approve(), None);
    }

    #[test]
    fn test_is_pending_matches_prefix() {
        for status in [
            ApprovalStatus::PendingMarketing,
            ApprovalStatus::PendingBranding,
            ApprovalStatus::PendingSocL1,
            ApprovalStatus::PendingSocL3,
            ApprovalStatus::PendingCiso,
            ApprovalStatus::Approved,
            ApprovalStatus::Rejected,
            ApprovalStatus::Released,
        ] {
            assert_eq!(status.is_pending(), status.as_str().starts_with("pending_"));
        }

        assert!(!ApprovalStatus::Approved.is_pending());
        assert!(!ApprovalStatus::Rejected.is_pending());
        assert!(!ApprovalStatus::Released.is_pending());
    }

    #[test]
    fn test_admin_roles_approve_every_gate() {
        for gate in GATE_ORDER {
            assert!(UserRole::Admin.can_approve_gate(gate));
            assert!(UserRole::SuperAdmin.can_approve_gate(gate));
        }
    }

    #[test]
    fn test_reviewer_roles_approve_exactly_one_gate() {
        let reviewers = [
            (UserRole::Marketing, ApprovalGate::Marketing),
            (UserRole::Branding, ApprovalGate::Branding),
            (UserRole::SocLevel1, ApprovalGate::SocL1),
            (UserRole::SocLevel3, ApprovalGate::SocL3),
            (UserRole::Ciso, ApprovalGate::Ciso),
        ];

        for (role, own_gate) in reviewers {
            for gate in GATE_ORDER {
                assert_eq!(role.can_approve_gate(gate), gate == own_gate);
            }
        }
    }

    #[test]
    fn test_user_role_approves_no_gate() {
        for gate in GATE_ORDER {
            assert!(!UserRole::User.can_approve_gate(gate));
        }
    }

    #[test]
    fn test_role_gate_round_trip() {
        // 审阅角色的门禁映射回该门禁的待审状态
        assert_eq!(
            UserRole::Marketing.target_gate().map(|g| g.pending_status()),
            Some(ApprovalStatus::PendingMarketing)
        );
        assert_eq!(
            UserRole::Ciso.target_gate().map(|g| g.pending_status()),
            Some(ApprovalStatus::PendingCiso)
        );

        for gate in GATE_ORDER {
            assert_eq!(gate.pending_status().required_gate(), Some(gate));
        }
    }

    #[test]
    fn test_release_and_reset_permissions() {
        assert!(UserRole::Ciso.can_release());
        assert!(UserRole::Admin.can_release());
        assert!(UserRole::SuperAdmin.can_release());
        assert!(!UserRole::Marketing.can_release());
        assert!(!UserRole::User.can_release());

        assert!(UserRole::Admin.can_reset());
        assert!(UserRole::SuperAdmin.can_reset());
        assert!(!UserRole::Ciso.can_reset());
    }

    #[test]
    fn test_transition_validity() {
        use ApprovalStatus::*;

        // 正向推进
        assert!(transition_valid(PendingMarketing, PendingBranding));
        assert!(transition_valid(PendingCiso, Approved));
        assert!(!transition_valid(PendingMarketing, PendingSocL1));

        // 驳回只能来自待审状态
        assert!(transition_valid(PendingSocL1, Rejected));
        assert!(!transition_valid(Approved, Rejected));
        assert!(!transition_valid(Released, Rejected));

        // 重置与发布
        assert!(transition_valid(Rejected, PendingMarketing));
        assert!(!transition_valid(Approved, PendingMarketing));
        assert!(transition_valid(Approved, Released));
        assert!(!transition_valid(PendingCiso, Released));
    }

    #[test]
    fn test_progress_percentage() {
        let progress = ApprovalProgress::build(ApprovalStatus::PendingMarketing, &[]);
        assert_eq!(progress.completed_count, 0);
        assert_eq!(progress.percentage(), 0);

        let two = [
            approval(ApprovalGate::Marketing),
            approval(ApprovalGate::Branding),
        ];
        let progress = ApprovalProgress::build(ApprovalStatus::PendingSocL1, &two);
        assert_eq!(progress.completed_count, 2);
        assert_eq!(progress.percentage(), 40);

        let all: Vec<_> = GATE_ORDER.iter().map(|g| approval(*g)).collect();
        let progress = ApprovalProgress::build(ApprovalStatus::Approved, &all);
        assert_eq!(progress.completed_count, 5);
        assert_eq!(progress.percentage(), 100);
    }

    #[test]
    fn test_progress_zero_total_does_not_panic() {
        let progress = ApprovalProgress {
            completed_gates: vec![],
            current_gate: None,
            pending_gates: vec![],
            total_gates: 0,
            completed_count: 0,
        };
        assert_eq!(progress.percentage(), 0);
    }

    #[test]
    fn test_progress_current_gate_follows_status() {
        let approvals = [approval(ApprovalGate::Marketing)];
        let progress = ApprovalProgress::build(ApprovalStatus::PendingBranding, &approvals);

        assert_eq!(progress.completed_gates, vec![ApprovalGate::Marketing]);
        assert_eq!(progress.current_gate, Some(ApprovalGate::Branding));
        assert_eq!(
            progress.pending_gates,
            vec![ApprovalGate::SocL1, ApprovalGate::SocL3, ApprovalGate::Ciso]
        );
    }

    #[test]
    fn test_progress_rejected_has_no_current_gate() {
        let approvals = [approval(ApprovalGate::Marketing)];
        let progress = ApprovalProgress::build(ApprovalStatus::Rejected, &approvals);

        assert_eq!(progress.current_gate, None);
        assert_eq!(progress.completed_count, 1);
        assert_eq!(progress.pending_gates.len(), 4);
    }

    #[test]
    fn test_progress_ignores_out_of_order_rows() {
        // SOC L1 记录缺少前置门禁时不计入已完成前缀
        let approvals = [approval(ApprovalGate::Marketing), approval(ApprovalGate::SocL1)];
        let progress = ApprovalProgress::build(ApprovalStatus::PendingBranding, &approvals);

        assert_eq!(progress.completed_gates, vec![ApprovalGate::Marketing]);
        assert_eq!(progress.current_gate, Some(ApprovalGate::Branding));
        assert_eq!(progress.completed_count, 1);
    }
}
