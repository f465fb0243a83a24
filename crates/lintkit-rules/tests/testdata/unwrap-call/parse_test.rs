// Test units are never reported.
fn helper() -> u32 {
    Some(1).unwrap()
}
