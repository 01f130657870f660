#![no_main]
use bgpkit_birdc::parser::resolve_timestamp;
use chrono::NaiveDate;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let now = NaiveDate::from_ymd_opt(2020, 3, 1)
        .unwrap()
        .and_hms_opt(0, 30, 0)
        .unwrap();
    let _ = resolve_timestamp(data, now);
});
