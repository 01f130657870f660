#![no_main]
use bgpkit_birdc::parser::parse_status;
use chrono::NaiveDate;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let now = NaiveDate::from_ymd_opt(2019, 12, 10)
        .unwrap()
        .and_hms_opt(10, 12, 19)
        .unwrap();
    let _ = parse_status(data, now);
});
