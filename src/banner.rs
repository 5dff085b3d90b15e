// src/banner.rs

/// Prints the application startup banner to the console.
pub fn print_banner() {
    let banner = r#"
 _                                            _
| |__   ___  _ __ ___   _____      _____  _ __| | __
| '_ \ / _ \| '_ ` _ \ / _ \ \ /\ / / _ \| '__| |/ /
| | | | (_) | | | | | |  __/\ V  V / (_) | |  |   <
|_| |_|\___/|_| |_| |_|\___| \_/\_/ \___/|_|  |_|\_\

    Homework review status -> Telegram
"#;
    println!("{}", banner);
}
