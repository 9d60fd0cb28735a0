use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use log::info;

pub(crate) fn create_out_directory<T: AsRef<std::ffi::OsStr>>(
    raw_path: T,
) -> anyhow::Result<()> {
    if let Some(p) = Path::new(&raw_path).parent() {
        if !p.exists() && p != Path::new("") {
            info!("creating directory at {p:?}");
            std::fs::create_dir_all(p)?;
        }
    }
    Ok(())
}

pub(crate) fn get_ticker() -> ProgressBar {
    let ticker = ProgressBar::new_spinner();
    ticker.set_style(ProgressStyle::with_template("> {pos} {msg}").unwrap());
    ticker
}

pub(crate) fn get_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template(
            "{spinner:.blue} [{elapsed_precise}] {pos} {msg}",
        )
        .unwrap()
        .tick_strings(&[
            "▹▹▹▹▹",
            "▸▹▹▹▹",
            "▹▸▹▹▹",
            "▹▹▸▹▹",
            "▹▹▹▸▹",
            "▹▹▹▹▸",
            "▪▪▪▪▪",
        ]),
    );
    spinner
}

fn get_master_progress_bar_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "[{elapsed_precise}] {bar:40.green/yellow} {pos:>7}/{len:7} {msg}",
    )
    .unwrap()
    .progress_chars("##-")
}

pub(crate) fn get_master_progress_bar<
    T: num_traits::Num + num_traits::cast::AsPrimitive<u64>,
>(
    n: T,
) -> ProgressBar {
    ProgressBar::new(n.as_()).with_style(get_master_progress_bar_style())
}
