//! Per-user, per-device authorization

use super::types::{Capabilities, Device};

/// Check whether `user_id` may perform `required` on `device`
///
/// A missing device or a user absent from the device's access list is never
/// permitted, even when nothing is required.
#[must_use]
pub fn is_permitted(device: Option<&Device>, user_id: &str, required: Capabilities) -> bool {
    let Some(device) = device else {
        return false;
    };

    device
        .permitted_user(user_id)
        .is_some_and(|user| user.permissions.satisfies(required))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::types::{NetworkInfo, PermittedUser};

    fn device(users: Vec<PermittedUser>) -> Device {
        Device {
            id: "d1".to_string(),
            name: "Office PC".to_string(),
            network: NetworkInfo::default(),
            permitted_users: users,
        }
    }

    fn user(id: &str, wol: bool, ping: bool) -> PermittedUser {
        PermittedUser {
            id: id.to_string(),
            permissions: Capabilities { wol, ping },
        }
    }

    #[test]
    fn missing_device_is_denied() {
        assert!(!is_permitted(None, "u1", Capabilities::NONE));
    }

    #[test]
    fn unknown_user_is_denied_even_without_requirements() {
        let d = device(vec![user("u1", true, true)]);
        assert!(!is_permitted(Some(&d), "u2", Capabilities::NONE));
    }

    #[test]
    fn listed_user_with_no_requirements_is_allowed() {
        let d = device(vec![user("u1", false, false)]);
        assert!(is_permitted(Some(&d), "u1", Capabilities::NONE));
    }

    #[test]
    fn every_required_flag_must_be_held() {
        let d = device(vec![user("u1", true, false)]);

        assert!(is_permitted(Some(&d), "u1", Capabilities::WAKE));
        assert!(!is_permitted(Some(&d), "u1", Capabilities::PING));
        assert!(!is_permitted(
            Some(&d),
            "u1",
            Capabilities {
                wol: true,
                ping: true
            }
        ));
    }

    #[test]
    fn unrequired_flags_are_not_checked() {
        // u1 lacks ping but only wol is required
        let d = device(vec![user("u1", true, false)]);
        assert!(is_permitted(
            Some(&d),
            "u1",
            Capabilities {
                wol: true,
                ping: false
            }
        ));
    }

    #[test]
    fn matches_user_by_exact_id() {
        let d = device(vec![user("u10", true, true), user("u1", false, true)]);
        assert!(!is_permitted(Some(&d), "u1", Capabilities::WAKE));
        assert!(is_permitted(Some(&d), "u10", Capabilities::WAKE));
    }
}
