//! This module contains the macros used in the project.

/// Prompt for a config value, persist it, and yield it
macro_rules! config_value {
    ($config:ident, $setting_name:ident, $struct_name:ident, $key_name:ident, $string:expr, $reader:expr) => {{
        println!(concat!("Please enter ", $string, ":"));
        let value = $reader?;
        let cloned_value = value.clone();
        $config.update(|config_data| {
            if let Some(local_config) = config_data.$setting_name.as_mut() {
                local_config.$key_name = Some(cloned_value);
            } else {
                config_data.$setting_name = Some($struct_name {
                    $key_name: Some(cloned_value),
                    ..Default::default()
                });
            }
        })?;
        value
    }};
}

/// Read a config value, prompting for it if missing
macro_rules! config_value_wrap {
    ($config:ident, $setting_name:ident, $struct_name:ident, $key_name:ident, $string:expr) => {
        match &$config.config_data.$setting_name {
            Some(c) => match &c.$key_name {
                Some(u) => u.clone(),
                None => $crate::config_value!(
                    $config,
                    $setting_name,
                    $struct_name,
                    $key_name,
                    $string,
                    $crate::utils::input()
                ),
            },
            None => $crate::config_value!(
                $config,
                $setting_name,
                $struct_name,
                $key_name,
                $string,
                $crate::utils::input()
            ),
        }
    };
}

/// Read a secret config value, prompting without echo if missing
macro_rules! config_password_wrap {
    ($config:ident, $setting_name:ident, $struct_name:ident, $key_name:ident, $string:expr) => {
        match &$config.config_data.$setting_name {
            Some(c) => match &c.$key_name {
                Some(u) => u.clone(),
                None => $crate::config_value!(
                    $config,
                    $setting_name,
                    $struct_name,
                    $key_name,
                    $string,
                    $crate::utils::get_password()
                ),
            },
            None => $crate::config_value!(
                $config,
                $setting_name,
                $struct_name,
                $key_name,
                $string,
                $crate::utils::get_password()
            ),
        }
    };
}

pub(crate) use config_password_wrap;
pub(crate) use config_value;
pub(crate) use config_value_wrap;
