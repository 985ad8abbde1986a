/// Title of the startup error dialog.
pub fn error_title(app_title: &str) -> String {
    format!("{app_title} - Engine Error")
}

/// Block on a modal error dialog.
pub fn show_error(app_title: &str, text: &str) {
    log::debug!("Showing error dialog");
    let _ = rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Error)
        .set_title(error_title(app_title))
        .set_description(text)
        .set_buttons(rfd::MessageButtons::Ok)
        .show();
}

#[test]
fn test_error_title() {
    assert_eq!(error_title("WinOpenGL"), "WinOpenGL - Engine Error");
}
