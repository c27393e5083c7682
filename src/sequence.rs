//! Record-sequence grammar over one customer section.
//!
//! A well-formed section opens with "01", runs one full `02 (03)* 04`
//! cycle, then any number of further cycles that may open with "02" or
//! "03" and must close with "04". The automaton below is that anchored
//! grammar, `01 (02 (03)* 04) ((02|03) (03)* 04)*`, spelled out state by
//! state.

use crate::record::RecordType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Nothing consumed yet; only "01" is legal.
    Start,
    /// Customer record seen; the first cycle must open with "02".
    ExpectFirstHeader,
    /// Inside a cycle; "03" repeats, "04" closes.
    InBlock,
    /// A cycle just closed; accepting. "02" or "03" opens the next cycle.
    CycleDone,
    /// No suffix can recover a dead trace.
    Dead,
}

fn step(state: State, symbol: RecordType) -> State {
    use RecordType::*;
    match (state, symbol) {
        (State::Start, CustomerOpen) => State::ExpectFirstHeader,
        (State::ExpectFirstHeader, CardHeader) => State::InBlock,
        (State::InBlock, Detail) => State::InBlock,
        (State::InBlock, BlockClose) => State::CycleDone,
        (State::CycleDone, CardHeader | Detail) => State::InBlock,
        _ => State::Dead,
    }
}

/// True when a customer's ordered record-type trace matches the statement
/// grammar end to end.
pub fn is_valid(trace: &[RecordType]) -> bool {
    let mut state = State::Start;
    for &symbol in trace {
        state = step(state, symbol);
        if state == State::Dead {
            return false;
        }
    }
    state == State::CycleDone
}

/// Renders a trace the way reconciliation staff read it: codes joined with
/// "->", e.g. `01->02->03->04`.
pub fn arrow_join(trace: &[RecordType]) -> String {
    trace
        .iter()
        .map(|rt| rt.code())
        .collect::<Vec<_>>()
        .join("->")
}
