use psl_quote::{render_quote, InputSource, INPUT_ENV};

fn main() -> anyhow::Result<()> {
    psl_observability::init();

    let source = InputSource::select(std::env::args().nth(1), std::env::var(INPUT_ENV).ok());
    tracing::debug!(source = ?source, "reading quote input");

    let input = source.read()?;
    let price = input.resolve();
    tracing::info!(
        price = %price.label(),
        variations = input.variations.len(),
        "quote resolved"
    );

    print!("{}", render_quote(&input));
    Ok(())
}
