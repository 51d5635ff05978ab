use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

pub const DEFAULT_WORK_SECS: u32 = 1500;

/// Which sound accompanies the end-of-work notification. Playback is the
/// shell's job; the core only remembers the choice.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationSound {
    MetalPipe,
    System,
    #[serde(rename = "none")]
    Silent,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimerSettings {
    pub work_secs: u32,
    pub notifications_enabled: bool,
    pub sound: NotificationSound,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            work_secs: DEFAULT_WORK_SECS,
            notifications_enabled: true,
            sound: NotificationSound::MetalPipe,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct UserSettings {
    timer: TimerSettings,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn timer(&self) -> TimerSettings {
        self.data.read().unwrap().timer.clone()
    }

    pub fn update_timer(&self, settings: TimerSettings) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.timer = settings;
        self.persist(&guard)
    }

    /// Set the work interval length. A zero-length interval is ignored.
    pub fn set_work_secs(&self, work_secs: u32) -> Result<()> {
        if work_secs == 0 {
            debug!("ignoring work interval of 0s");
            return Ok(());
        }
        let mut guard = self.data.write().unwrap();
        guard.timer.work_secs = work_secs;
        self.persist(&guard)
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use uuid::Uuid;

    use super::{NotificationSound, SettingsStore, TimerSettings, DEFAULT_WORK_SECS};

    fn scratch_path() -> PathBuf {
        std::env::temp_dir().join(format!("clocky-settings-{}.json", Uuid::new_v4()))
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = scratch_path();
        let store = SettingsStore::new(path.clone()).expect("store");
        let settings = store.timer();
        assert_eq!(settings.work_secs, DEFAULT_WORK_SECS);
        assert!(settings.notifications_enabled);
        assert_eq!(settings.sound, NotificationSound::MetalPipe);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn updates_survive_reload() {
        let path = scratch_path();
        {
            let store = SettingsStore::new(path.clone()).expect("store");
            store
                .update_timer(TimerSettings {
                    work_secs: 3000,
                    notifications_enabled: false,
                    sound: NotificationSound::Silent,
                })
                .expect("update");
        }

        let reloaded = SettingsStore::new(path.clone()).expect("reload");
        let settings = reloaded.timer();
        assert_eq!(settings.work_secs, 3000);
        assert!(!settings.notifications_enabled);
        assert_eq!(settings.sound, NotificationSound::Silent);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn zero_work_interval_is_ignored() {
        let path = scratch_path();
        let store = SettingsStore::new(path.clone()).expect("store");
        store.set_work_secs(0).expect("set");
        assert_eq!(store.timer().work_secs, DEFAULT_WORK_SECS);

        store.set_work_secs(600).expect("set");
        assert_eq!(store.timer().work_secs, 600);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let path = scratch_path();
        std::fs::write(&path, "not json at all").expect("write junk");
        let store = SettingsStore::new(path.clone()).expect("store");
        assert_eq!(store.timer().work_secs, DEFAULT_WORK_SECS);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn sound_choice_wire_names() {
        let json = serde_json::to_value(NotificationSound::MetalPipe).expect("serialize");
        assert_eq!(json, "metal-pipe");
        let json = serde_json::to_value(NotificationSound::Silent).expect("serialize");
        assert_eq!(json, "none");
        let parsed: NotificationSound =
            serde_json::from_str("\"system\"").expect("deserialize");
        assert_eq!(parsed, NotificationSound::System);
    }
}
