//! Compiler flag scraping.

/// Flags whose following token names an include directory.
const INCLUDE_FLAGS: &[&str] = &["-I", "-i", "-isystem", "-iquote", "-idirafter"];

/// Compiler flags split into include directories and everything else.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ScrapedFlags {
    pub(crate) include_dirs: Vec<String>,
    pub(crate) cflags: Vec<String>,
}

/// Split include-path flags off `flags`.
///
/// Returns the offending flag when an include flag ends the list.
pub(crate) fn scrape(flags: &[String]) -> Result<ScrapedFlags, String> {
    let mut scraped = ScrapedFlags::default();
    let mut tokens = flags.iter();
    while let Some(flag) = tokens.next() {
        if INCLUDE_FLAGS.contains(&flag.as_str()) {
            let dir = tokens.next().ok_or_else(|| flag.clone())?;
            scraped.include_dirs.push(dir.clone());
        } else {
            scraped.cflags.push(flag.clone());
        }
    }
    Ok(scraped)
}
