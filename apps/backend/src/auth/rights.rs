//! Rights bits and the permission rules built from them.
//!
//! A user's rights are an `i64` bitmask snapshotted into the token. A route
//! group is guarded by a [`RightHandler`]: a list of acceptable masks plus the
//! message sent back on denial. The caller passes if, for any mask, every bit
//! of that mask is set in its rights. New tiers are new rule values.

use std::borrow::Cow;

use tracing::warn;

use super::claims::Claims;
use crate::AppError;

/// Account is activated
pub const ACTIVE: i64 = 1;
pub const SUPER_ADMIN: i64 = 1 << 1;
pub const ADMIN: i64 = 1 << 2;
pub const OBSERVATORY: i64 = 1 << 3;
pub const COPRO: i64 = 1 << 4;
pub const RENEW_PROJECT: i64 = 1 << 5;
pub const HOUSING: i64 = 1 << 6;
pub const PRE_PROG: i64 = 1 << 7;

pub const ACTIVE_ADMIN: i64 = ACTIVE | ADMIN;
pub const ACTIVE_SUPER_ADMIN: i64 = ACTIVE | ADMIN | SUPER_ADMIN;
pub const ACTIVE_OBSERVATORY: i64 = ACTIVE | OBSERVATORY;
pub const ACTIVE_COPRO: i64 = ACTIVE | COPRO;
pub const ACTIVE_RENEW_PROJECT: i64 = ACTIVE | RENEW_PROJECT;
pub const ACTIVE_HOUSING: i64 = ACTIVE | HOUSING;
pub const ACTIVE_PRE_PROG: i64 = ACTIVE | PRE_PROG;

/// Permission rule guarding a group of operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RightHandler {
    masks: Vec<i64>,
    message: Cow<'static, str>,
}

impl RightHandler {
    pub fn new(masks: impl Into<Vec<i64>>, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            masks: masks.into(),
            message: message.into(),
        }
    }

    pub fn masks(&self) -> &[i64] {
        &self.masks
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// OR across masks, AND within a mask. An empty rule allows nobody.
    pub fn allows(&self, rights: i64) -> bool {
        self.masks.iter().any(|&mask| rights & mask == mask)
    }

    pub fn evaluate(&self, claims: &Claims) -> Result<(), AppError> {
        if self.allows(claims.rig) {
            return Ok(());
        }
        warn!(
            user_id = claims.sub,
            rights = claims.rig,
            required = ?self.masks,
            "permission denied"
        );
        Err(AppError::permission_denied(self.message.clone()))
    }
}

/// Any activated account.
pub fn active_user() -> RightHandler {
    RightHandler::new([ACTIVE], "Active account required")
}

pub fn admin_only() -> RightHandler {
    RightHandler::new([ACTIVE_ADMIN], "Admin rights required")
}

pub fn super_admin_only() -> RightHandler {
    RightHandler::new([ACTIVE_SUPER_ADMIN], "Super admin rights required")
}

pub fn copro_rights() -> RightHandler {
    RightHandler::new([ACTIVE_ADMIN, ACTIVE_COPRO], "Admin or copro rights required")
}

pub fn renew_project_rights() -> RightHandler {
    RightHandler::new(
        [ACTIVE_ADMIN, ACTIVE_RENEW_PROJECT],
        "Admin or renew project rights required",
    )
}

pub fn housing_rights() -> RightHandler {
    RightHandler::new([ACTIVE_ADMIN, ACTIVE_HOUSING], "Admin or housing rights required")
}

pub fn observatory_rights() -> RightHandler {
    RightHandler::new(
        [ACTIVE_ADMIN, ACTIVE_OBSERVATORY],
        "Admin or observatory rights required",
    )
}

pub fn pre_prog_rights() -> RightHandler {
    RightHandler::new([ACTIVE_ADMIN, ACTIVE_PRE_PROG], "Admin or pre-programming rights required")
}
