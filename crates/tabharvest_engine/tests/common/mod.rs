#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tabharvest_engine::Sleeper;

/// Records requested pauses instead of sleeping.
#[derive(Default)]
pub struct RecordingSleeper {
    pauses: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.pauses.lock().unwrap().push(duration);
    }
}

/// Markup with a views table holding `rows`.
pub fn table_page(rows: &[[&str; 8]]) -> String {
    let body: String = rows
        .iter()
        .map(|row| {
            let cells: String = row.iter().map(|c| format!("<td> {c} </td>")).collect();
            format!("<tr>{cells}</tr>")
        })
        .collect();
    format!(
        "<html><body><table class=\"views-table cols-8\"><thead><tr><th>Name</th></tr></thead>\
         <tbody>{body}</tbody></table></body></html>"
    )
}

pub fn init_logging() {
    engine_logging::initialize_for_tests();
}
