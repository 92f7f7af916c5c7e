#![no_main]

//! Command record parser fuzzer.
//!
//! Arbitrary bytes must either fail to parse or produce a command whose
//! re-encoded payload parses back to the same command.

use conquest::Command;
use conquest::sync::{CommandPayload, CommandRecord};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(record) = serde_json::from_slice::<CommandRecord>(data) else {
        return;
    };
    let Ok(command) = Command::try_from(&record.command) else {
        return;
    };

    let payload = CommandPayload::from(&command);
    let reparsed = Command::try_from(&payload).expect("encoded payload must parse");
    assert_eq!(reparsed, command);
});
