use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "assets/"]
struct Asset;

/// Contents of an embedded text file. The asset set is fixed at build time,
/// so a missing or non-UTF-8 file is a packaging bug.
pub(crate) fn text(path: &str) -> String {
    let file = Asset::get(path).unwrap_or_else(|| panic!("Missing embedded asset: {}", path));
    String::from_utf8_lossy(file.data.as_ref()).into_owned()
}
