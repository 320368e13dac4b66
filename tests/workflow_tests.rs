//! 审批工作流模型测试
//!
//! 覆盖五道门禁的完整流转、驳回与重置规则

use newsdesk::models::approval::{
    transition_valid, ApprovalGate, ApprovalStatus, ApproveArticleRequest, RejectArticleRequest,
    GATE_ORDER,
};
use newsdesk::models::user::UserRole;
use validator::Validate;

// ==================== 完整流转链 ====================

#[test]
fn test_full_approval_chain_reaches_approved() {
    // pending_marketing -> ... -> pending_ciso -> approved
    let mut status = ApprovalStatus::PendingMarketing;
    let mut hops = 0;

    while let Some(next) = status.next_on_approve() {
        assert!(transition_valid(status, next));
        status = next;
        hops += 1;
    }

    assert_eq!(status, ApprovalStatus::Approved);
    assert_eq!(hops, GATE_ORDER.len());
}

#[test]
fn test_each_pending_status_maps_to_its_gate() {
    for gate in GATE_ORDER {
        let status = gate.pending_status();
        assert!(status.is_pending());
        assert_eq!(status.required_gate(), Some(gate));
    }
}

#[test]
fn test_gates_cannot_be_skipped() {
    // marketing 审批后不能直接跳到 ciso
    assert!(!transition_valid(
        ApprovalStatus::PendingMarketing,
        ApprovalStatus::PendingCiso,
    ));
    assert!(!transition_valid(
        ApprovalStatus::PendingBranding,
        ApprovalStatus::Approved,
    ));
}

#[test]
fn test_release_only_from_approved() {
    assert!(transition_valid(ApprovalStatus::Approved, ApprovalStatus::Released));

    for gate in GATE_ORDER {
        assert!(!transition_valid(gate.pending_status(), ApprovalStatus::Released));
    }
    assert!(!transition_valid(ApprovalStatus::Rejected, ApprovalStatus::Released));
}

#[test]
fn test_reject_allowed_from_any_pending() {
    for gate in GATE_ORDER {
        assert!(transition_valid(gate.pending_status(), ApprovalStatus::Rejected));
    }
    // 终态不能再驳回
    assert!(!transition_valid(ApprovalStatus::Released, ApprovalStatus::Rejected));
}

#[test]
fn test_reset_returns_to_first_gate() {
    assert!(transition_valid(ApprovalStatus::Rejected, ApprovalStatus::PendingMarketing));
    // 重置只能回到第一道门禁
    assert!(!transition_valid(ApprovalStatus::Rejected, ApprovalStatus::PendingBranding));
}

#[test]
fn test_released_is_terminal() {
    for gate in GATE_ORDER {
        assert!(!transition_valid(ApprovalStatus::Released, gate.pending_status()));
    }
    assert!(!transition_valid(ApprovalStatus::Released, ApprovalStatus::Approved));
    assert!(!transition_valid(ApprovalStatus::Released, ApprovalStatus::Rejected));
}

// ==================== 角色授权 ====================

#[test]
fn test_each_reviewer_role_only_approves_own_gate() {
    let pairs = [
        (UserRole::Marketing, ApprovalGate::Marketing),
        (UserRole::Branding, ApprovalGate::Branding),
        (UserRole::SocLevel1, ApprovalGate::SocL1),
        (UserRole::SocLevel3, ApprovalGate::SocL3),
        (UserRole::Ciso, ApprovalGate::Ciso),
    ];

    for (role, own_gate) in pairs {
        for gate in GATE_ORDER {
            assert_eq!(role.can_approve_gate(gate), gate == own_gate);
        }
    }
}

#[test]
fn test_admins_approve_every_gate() {
    for gate in GATE_ORDER {
        assert!(UserRole::Admin.can_approve_gate(gate));
        assert!(UserRole::SuperAdmin.can_approve_gate(gate));
    }
}

#[test]
fn test_regular_user_approves_nothing() {
    for gate in GATE_ORDER {
        assert!(!UserRole::User.can_approve_gate(gate));
    }
    assert!(UserRole::User.target_gate().is_none());
}

#[test]
fn test_release_and_reset_permissions() {
    assert!(UserRole::Ciso.can_release());
    assert!(UserRole::Admin.can_release());
    assert!(UserRole::SuperAdmin.can_release());
    assert!(!UserRole::Marketing.can_release());
    assert!(!UserRole::SocLevel3.can_release());

    assert!(UserRole::Admin.can_reset());
    assert!(UserRole::SuperAdmin.can_reset());
    assert!(!UserRole::Ciso.can_reset());
    assert!(!UserRole::User.can_reset());
}

// ==================== 请求校验 ====================

#[test]
fn test_rejection_reason_length_bounds() {
    // 9 个字符：太短
    let req = RejectArticleRequest { reason: "a".repeat(9) };
    assert!(req.validate().is_err());

    // 10 个字符：刚好合法
    let req = RejectArticleRequest { reason: "a".repeat(10) };
    assert!(req.validate().is_ok());

    // 2000 个字符：上界合法
    let req = RejectArticleRequest { reason: "a".repeat(2000) };
    assert!(req.validate().is_ok());

    // 2001 个字符:超出上界
    let req = RejectArticleRequest { reason: "a".repeat(2001) };
    assert!(req.validate().is_err());
}

#[test]
fn test_approve_notes_optional_and_bounded() {
    let req = ApproveArticleRequest { notes: None };
    assert!(req.validate().is_ok());

    let req = ApproveArticleRequest { notes: Some("looks good".to_string()) };
    assert!(req.validate().is_ok());

    let req = ApproveArticleRequest { notes: Some("a".repeat(1001)) };
    assert!(req.validate().is_err());
}
