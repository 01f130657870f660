#![no_main]
use bgpkit_birdc::parser::parse_routes;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let _ = parse_routes(data);
});
