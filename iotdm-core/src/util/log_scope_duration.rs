/*
    Copyright 2025 MydriaTech AB

    Licensed under the Apache License 2.0 with Free world makers exception
    1.0.0 (the "License"); you may not use this file except in compliance with
    the License. You should have obtained a copy of the License with the source
    or binary distribution in file named

        LICENSE-Apache-2.0-with-FWM-Exception-1.0.0

    Unless required by applicable law or agreed to in writing, software
    distributed under the License is distributed on an "AS IS" BASIS,
    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
    See the License for the specific language governing permissions and
    limitations under the License.
*/


//! Logging of the time spent in a scope.

use std::time::Duration;
use std::time::Instant;

/// Log the time spent from creation until the instance is dropped.
pub struct LogScopeDuration<'a> {
    level: log::Level,
    module_path: &'a str,
    scope_name: &'a str,
    start: Instant,
    min_duration_to_log: Duration,
}

impl<'a> LogScopeDuration<'a> {
    /// Return a new instance or `None` if nothing would be logged at `level`.
    ///
    /// You can retrieve the module path of the caller using the `module_path!()` macro.
    pub fn new(
        level: log::Level,
        module_path: &'a str,
        scope_name: &'a str,
        min_millis_to_log: u64,
    ) -> Option<Self> {
        log::log_enabled!(target: module_path, level).then(|| Self {
            level,
            module_path,
            scope_name,
            start: Instant::now(),
            min_duration_to_log: Duration::from_millis(min_millis_to_log),
        })
    }

    /// Time spent so far.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for LogScopeDuration<'_> {
    fn drop(&mut self) {
        let elapsed = self.elapsed();
        if elapsed >= self.min_duration_to_log {
            log::log!(target: self.module_path, self.level, "'{}' took {} ms.", self.scope_name, elapsed.as_millis());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_level_is_not_tracked() {
        let _ = env_logger::builder()
            .is_test(true)
            .filter_level(log::LevelFilter::Debug)
            .try_init();
        let lsd = LogScopeDuration::new(log::Level::Debug, module_path!(), "tracked", 0);
        assert!(lsd.is_some());
        let lsd = LogScopeDuration::new(log::Level::Trace, module_path!(), "filtered", 0);
        assert!(lsd.is_none());
    }
}
