use super::mutators::{set_bool, set_int, set_string};
use super::validators::{is_positive, is_url, is_valid_disk_size, is_valid_driver};
use super::Setting;
use crate::addons::BUILTIN_ADDONS;

/// Name of the setting which selects the in-process machine driver client.
pub const USE_VENDORED_DRIVER: &str = "use-vendored-driver";

pub(super) fn settings() -> Vec<Setting> {
    let mut settings = vec![
        Setting::new("vm-driver", set_string).with_validators(vec![is_valid_driver]),
        Setting::new("v", set_int).with_validators(vec![is_positive]),
        Setting::new("cpus", set_int).with_validators(vec![is_positive]),
        Setting::new("disk-size", set_string).with_validators(vec![is_valid_disk_size]),
        Setting::new("host-only-cidr", set_string),
        Setting::new("memory", set_int).with_validators(vec![is_positive]),
        Setting::new("log_dir", set_string),
        Setting::new("kubernetes-version", set_string),
        Setting::new("iso-url", set_string).with_validators(vec![is_url]),
        Setting::new(USE_VENDORED_DRIVER, set_bool),
        Setting::new("show-libmachine-logs", set_bool),
        Setting::new("WantUpdateNotification", set_bool),
        Setting::new("ReminderWaitPeriodInHours", set_int),
        Setting::new("WantReportError", set_bool),
        Setting::new("WantReportErrorPrompt", set_bool),
        Setting::new("WantKubectlDownloadMsg", set_bool),
    ];

    // Each add-on records whether it is enabled under its own name.
    settings.extend(
        BUILTIN_ADDONS
            .iter()
            .map(|&name| Setting::new(name, set_bool)),
    );
    settings
}

#[cfg(test)]
mod test {
    use crate::config::ConfigValue;
    use crate::{ConfigStore, SettingRegistry};

    #[test]
    fn test_builtin_names_are_unique() {
        let builtin = SettingRegistry::builtin();
        let settings = builtin.iter().cloned().collect();
        assert!(SettingRegistry::new(settings).is_ok());
    }

    #[test]
    fn test_builtin_apply() {
        let registry = SettingRegistry::builtin();
        let mut store = ConfigStore::new();

        registry.apply(&mut store, "memory", "4096").unwrap();
        registry.apply(&mut store, "vm-driver", "kvm2").unwrap();
        registry
            .apply(&mut store, super::USE_VENDORED_DRIVER, "true")
            .unwrap();

        assert_eq!(store.get("memory"), Some(&ConfigValue::Int(4096)));
        assert_eq!(store.get("vm-driver"), Some(&ConfigValue::from("kvm2")));
        assert_eq!(store.get_bool(super::USE_VENDORED_DRIVER), Some(true));

        registry.apply(&mut store, "dashboard", "True").unwrap();
        assert_eq!(store.get_bool("dashboard"), Some(true));
        assert!(registry.apply(&mut store, "dashboard", "maybe").is_err());

        assert!(registry.apply(&mut store, "memory", "-1").is_err());
        assert!(registry.apply(&mut store, "vm-driver", "qemu").is_err());
        assert_eq!(store.len(), 4);
    }
}
