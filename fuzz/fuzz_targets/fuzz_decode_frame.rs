#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Interpret the input as one wire line from a vehicle connection
    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(frame) = galvani::gateway::decode_frame(line) {
        // Known inbound channel names must parse or fail cleanly too
        let _ = galvani::channel::InboundEvent::parse(&frame.event, &frame.data);
    }
});
