use std::path::PathBuf;

use gene_census::sample::{write_sample, SampleSpec};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let spec = SampleSpec::default();
    let paths = write_sample(&dir, &spec)?;

    println!(
        "Wrote {} train, {} test and {} validation rows to {}",
        spec.train,
        spec.test,
        spec.validation,
        paths.train.parent().unwrap_or(&dir).display()
    );
    Ok(())
}
