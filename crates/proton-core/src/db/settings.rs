//! Operator settings, stopwatch and tally persistence.

use super::{Database, DbError, DbResult};
use crate::models::{DeskSettings, TallyCounter, Theme};

pub const FIXED_REVIEWER_KEY: &str = "fixed_reviewer";
pub const FIXED_CONVENIO_KEY: &str = "fixed_convenio";
pub const THEME_KEY: &str = "theme";
pub const TIMER_SECONDS_KEY: &str = "timer_seconds";
pub const TIMER_RUNNING_KEY: &str = "timer_was_running";
pub const TALLY_OUTPATIENT_KEY: &str = "tally_outpatient";
pub const TALLY_INPATIENT_KEY: &str = "tally_inpatient";

impl Database {
    /// Load settings; absent keys take their defaults.
    pub fn load_settings(&self) -> DbResult<DeskSettings> {
        Ok(DeskSettings {
            fixed_reviewer: self.get_value(FIXED_REVIEWER_KEY)?,
            fixed_convenio: self.get_value(FIXED_CONVENIO_KEY)?,
            theme: self
                .get_value(THEME_KEY)?
                .map(|t| Theme::parse(&t))
                .unwrap_or_default(),
            timer_seconds: self.get_counter(TIMER_SECONDS_KEY)?,
        })
    }

    /// Save settings; unset optional values are removed.
    pub fn save_settings(&self, settings: &DeskSettings) -> DbResult<()> {
        self.set_optional(FIXED_REVIEWER_KEY, settings.fixed_reviewer.as_deref())?;
        self.set_optional(FIXED_CONVENIO_KEY, settings.fixed_convenio.as_deref())?;
        self.set_value(THEME_KEY, settings.theme.as_str())?;
        self.set_value(TIMER_SECONDS_KEY, &settings.timer_seconds.to_string())?;
        Ok(())
    }

    pub fn save_timer(&self, seconds: u64, running: bool) -> DbResult<()> {
        self.set_value(TIMER_SECONDS_KEY, &seconds.to_string())?;
        self.set_value(TIMER_RUNNING_KEY, if running { "true" } else { "false" })?;
        Ok(())
    }

    /// Whether the stopwatch was running when the last session ended.
    pub fn timer_was_running(&self) -> DbResult<bool> {
        Ok(self.get_value(TIMER_RUNNING_KEY)?.as_deref() == Some("true"))
    }

    pub fn load_tally(&self) -> DbResult<TallyCounter> {
        Ok(TallyCounter {
            outpatient: self.get_counter(TALLY_OUTPATIENT_KEY)?,
            inpatient: self.get_counter(TALLY_INPATIENT_KEY)?,
        })
    }

    pub fn save_tally(&self, tally: &TallyCounter) -> DbResult<()> {
        self.set_value(TALLY_OUTPATIENT_KEY, &tally.outpatient.to_string())?;
        self.set_value(TALLY_INPATIENT_KEY, &tally.inpatient.to_string())?;
        Ok(())
    }

    fn set_optional(&self, key: &str, value: Option<&str>) -> DbResult<()> {
        match value {
            Some(v) => self.set_value(key, v),
            None => self.remove_value(key).map(|_| ()),
        }
    }

    fn get_counter(&self, key: &str) -> DbResult<u64> {
        match self.get_value(key)? {
            None => Ok(0),
            Some(raw) => raw.trim().parse().map_err(|_| DbError::InvalidValue {
                key: key.to_string(),
                value: raw,
            }),
        }
    }
}
