//! Device search for pickers and autocomplete

use super::policy::is_permitted;
use super::types::{Capabilities, DeviceChoice, Devices};

/// Devices whose name contains `query` (case-insensitive) and on which
/// `user_id` holds `required`, in registry order
///
/// Devices the user cannot act on never appear, so this cannot be used to
/// enumerate them.
#[must_use]
pub fn search_devices(
    devices: &Devices,
    query: &str,
    user_id: &str,
    required: Capabilities,
) -> Vec<DeviceChoice> {
    let query = query.to_lowercase();

    devices
        .iter()
        .filter(|device| {
            device.name.to_lowercase().contains(&query)
                && is_permitted(Some(device), user_id, required)
        })
        .map(|device| DeviceChoice {
            name: device.name.clone(),
            value: device.id.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::types::{Device, NetworkInfo, PermittedUser};

    fn dev(id: &str, name: &str, users: &[(&str, Capabilities)]) -> Device {
        Device {
            id: id.to_string(),
            name: name.to_string(),
            network: NetworkInfo::default(),
            permitted_users: users
                .iter()
                .map(|(id, permissions)| PermittedUser {
                    id: (*id).to_string(),
                    permissions: *permissions,
                })
                .collect(),
        }
    }

    fn registry() -> Devices {
        Devices::new(vec![
            dev("d1", "Office PC", &[("u1", Capabilities::WAKE)]),
            dev("d2", "Living Room HTPC", &[("u1", Capabilities::PING)]),
            dev("d3", "office NAS", &[("u1", Capabilities::WAKE), ("u2", Capabilities::WAKE)]),
        ])
    }

    #[test]
    fn filters_by_name_case_insensitively() {
        let hits = search_devices(&registry(), "OFFICE", "u1", Capabilities::WAKE);
        let ids: Vec<_> = hits.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(ids, ["d1", "d3"]);
    }

    #[test]
    fn empty_query_matches_all_permitted() {
        let hits = search_devices(&registry(), "", "u1", Capabilities::NONE);
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn hides_devices_without_capability() {
        let hits = search_devices(&registry(), "", "u1", Capabilities::PING);
        assert_eq!(
            hits,
            vec![DeviceChoice {
                name: "Living Room HTPC".to_string(),
                value: "d2".to_string(),
            }]
        );
    }

    #[test]
    fn preserves_registry_order() {
        let hits = search_devices(&registry(), "o", "u1", Capabilities::NONE);
        let ids: Vec<_> = hits.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(ids, ["d1", "d2", "d3"]);
    }

    #[test]
    fn unknown_user_sees_nothing() {
        assert!(search_devices(&registry(), "", "u9", Capabilities::NONE).is_empty());
    }
}
