use ron::de::from_reader;
use ron::ser::{to_string_pretty, PrettyConfig};
use serde::{Deserialize, Serialize};
use std::fs;

use platform_dirs::AppDirs;

#[derive(Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "defaults::float_digits")]
    pub float_digits: i32,
    #[serde(default = "defaults::show_parts")]
    pub show_parts: bool,
}

macro_rules! default_ {
    ($name:ident, $type:ident) => {
        pub fn $name() -> $type {
            Config::default().$name
        }
    };
}

mod defaults {
    use super::Config;
    default_!(float_digits, i32);
    default_!(show_parts, bool);
}

impl Default for Config {
    fn default() -> Self {
        Self {
            float_digits: 12,
            show_parts: false,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let Some(dirs) = AppDirs::new(Some("decrat"), false) else {
            return Self::default();
        };
        let _ = fs::create_dir_all(&dirs.config_dir);
        let path = dirs.config_dir.join("decrat.cfg");
        let file = match fs::File::open(&path) {
            Ok(file) => file,
            Err(_) => {
                Self::default().write_to(&path);
                return Self::default();
            }
        };
        match from_reader::<fs::File, Self>(file) {
            Ok(conf) => {
                // write back defaults for any fields missing on disk
                conf.write_to(&path);
                conf
            }
            Err(_) => Self::default(),
        }
    }

    fn write_to(&self, path: &std::path::Path) {
        if let Ok(text) = to_string_pretty(self, PrettyConfig::default()) {
            let _ = fs::write(path, text);
        }
    }
}
