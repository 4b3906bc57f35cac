use chrono::NaiveDate;

use crate::blueprint::Blueprint;
use crate::calendar::status::today;
use crate::runtime::TargetRuntime;

pub struct AppContext {
    pub blueprint: Blueprint,
    pub runtime: TargetRuntime,
}

impl AppContext {
    /// Current calendar date in the configured offset.
    pub fn today(&self) -> anyhow::Result<NaiveDate> {
        today(self.runtime.instance.now()?, self.blueprint.calendar.offset)
    }
}
