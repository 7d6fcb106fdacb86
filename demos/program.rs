use ndskit::formats::strm::Strm;
use ndskit::{NdsProvider, Result};

fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let mut provider = NdsProvider::new("game.nds")?;
    provider.options.unpack_narc_files = true;
    provider.options.unpack_sdat_files = true;
    provider.initialize()?;

    if let Some(header) = provider.header() {
        println!("{} [{}]", header.game_title, header.game_code);
    }
    provider.log_file_stats();

    for file in provider.get_all_files_of::<Strm>() {
        let strm = provider.load_object_from::<Strm>(file)?;
        println!(
            "{}: {} Hz, {} samples",
            file.path, strm.head.sample_rate, strm.head.samples
        );
    }

    Ok(())
}
