async fn run() {
    // want: result of `save` is discarded
    let _ = save("x");
    // want: result of `flush` is discarded
    let _ = flush().await;
    // want: result of `save` is discarded
    let _ = crate::save("y");
    let _ = len("x");
    let _ = std::fs::remove_file("x");
    if let Err(e) = save("z") {
        eprintln!("{e}");
    }
}
