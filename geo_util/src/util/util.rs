/*
This file is part of the Campus GIS Lab Tools
Copyright (C) 2022 Novel-T

The Campus GIS Lab Tools is free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation, either version 3 of the License, or
(at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with this program.  If not, see <http://www.gnu.org/licenses/>.
*/
use std::time::{Duration, Instant};
use log::info;

pub fn format_duration(d: Duration) -> String {
    let mut secs = d.as_secs();
    let hours = secs / 3600;
    secs = secs % 3600;
    let minutes = secs / 60;
    secs = secs % 60;

    let ms = d.as_millis() % 1000;

    format!("{}h {}m {}s {}ms", hours, minutes, secs, ms )
}

/// Quotes a value for an OGR attribute filter, single quotes are doubled
pub fn quote_sql_string(s: &str) -> String
{
    let mut r = String::with_capacity(s.len() + 2);

    r.push('\'');

    for c in s.chars() {
        if c == '\'' {
            r.push('\'');
        }
        r.push(c);
    }

    r.push('\'');

    r
}

/// Logs the estimated remaining time of a feature loop, at most every 3 seconds
pub struct ProgressReporter {
    start: Instant,
    last_output: Instant,
    total: u64,
}

impl ProgressReporter {
    pub fn new(total: u64) -> Self {
        let now = Instant::now();
        ProgressReporter {
            start: now,
            last_output: now,
            total,
        }
    }

    pub fn tick(&mut self, num_processed: u64) {
        if self.last_output.elapsed().as_secs() < 3 {
            return;
        }
        self.last_output = Instant::now();

        let elapsed = self.start.elapsed();

        info!("Through {} of {}  Elapsed: {}  Est. Remaining: {}",
              num_processed, self.total,
              format_duration(elapsed),
              format_duration(estimate_remaining(elapsed, num_processed, self.total)));
    }
}

/// Remaining time if the rest goes at the same pace as the first `num_processed`
pub fn estimate_remaining(elapsed: Duration, num_processed: u64, total: u64) -> Duration {
    let remaining = total.saturating_sub(num_processed);
    elapsed.mul_f64(remaining as f64 / num_processed.max(1) as f64)
}
