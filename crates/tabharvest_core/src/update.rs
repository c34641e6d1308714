use crate::{Effect, FetchResult, Msg, RunState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: RunState, msg: Msg) -> (RunState, Vec<Effect>) {
    let effects = match msg {
        Msg::PageCompleted { page, result } => {
            if !state.mark_completed(page) {
                return (state, Vec::new());
            }
            match result {
                FetchResult::Rows(rows) if rows.is_empty() => {
                    // Neither a success nor a failure: the page is dropped.
                    state.record_empty_page();
                    Vec::new()
                }
                FetchResult::Rows(rows) => {
                    let processed = state.record_rows(rows);
                    let mut effects = Vec::new();
                    if state.is_chunk_boundary() {
                        let (label, rows) = state.take_full_chunk();
                        effects.push(Effect::FlushChunk { label, rows });
                    }
                    if state.is_progress_boundary() {
                        effects.push(Effect::ReportProgress {
                            processed,
                            total: state.total_pages(),
                        });
                    }
                    effects
                }
                FetchResult::AuthFailure | FetchResult::NotFound | FetchResult::TransientFailure => {
                    state.record_failure(page);
                    Vec::new()
                }
            }
        }
        Msg::TaskFailed { page, reason: _ } => {
            if state.mark_completed(page) {
                state.record_failure(page);
            }
            Vec::new()
        }
        Msg::AllTasksDrained => match state.take_final_chunk() {
            Some((label, rows)) => vec![Effect::FlushChunk { label, rows }],
            None => Vec::new(),
        },
    };

    (state, effects)
}
