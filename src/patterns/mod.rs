//! Pattern files: decoders for the two text formats and a cached library
//! over the user's pattern folder.

pub mod plaintext;
pub mod presets;
pub mod rle;

use crate::error::PatternError;
use crate::grid::Position;
use presets::Preset;
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// File that is always present in the pattern folder and selected on startup.
pub const DEFAULT_PATTERN: &str = "singular.cells";
const DEFAULT_PATTERN_TEXT: &str = "! singular.cells\nO";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternFormat {
    Plaintext,
    Rle,
}

impl PatternFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        if name.ends_with(".cells") {
            Some(PatternFormat::Plaintext)
        } else if name.ends_with(".rle") {
            Some(PatternFormat::Rle)
        } else {
            None
        }
    }
}

/// Decodes `text` in the given format.
///
/// An RLE pattern for a rule other than B3/S23 decodes to an empty list.
pub fn decode(format: PatternFormat, text: &str) -> Result<Vec<Position>, PatternError> {
    match format {
        PatternFormat::Plaintext => Ok(plaintext::decode(text).collect()),
        PatternFormat::Rle => {
            let decoder = rle::decode(text)?;
            if !decoder.header().is_conway() {
                log::warn!(
                    "Unsupported rule {:?}, pattern left empty",
                    decoder.header().rule.as_deref().unwrap_or_default()
                );
            }
            decoder.collect()
        }
    }
}

/// Where pattern files come from.
pub trait PatternSource {
    /// Names of all available files, pattern or not.
    fn list(&self) -> io::Result<Vec<String>>;
    fn read(&self, name: &str) -> io::Result<String>;
}

/// A pattern folder on disk.
#[derive(Debug, Clone)]
pub struct Directory {
    folder: PathBuf,
}

impl Directory {
    /// Opens `folder`, creating it and the default pattern when missing.
    ///
    /// A newly created folder is also seeded with the built-in presets.
    pub fn open(folder: impl AsRef<Path>) -> io::Result<Self> {
        let folder = folder.as_ref().to_path_buf();

        if !folder.exists() {
            fs::create_dir_all(&folder)?;
            for preset in Preset::ALL {
                fs::write(folder.join(preset.file_name()), preset.to_plaintext())?;
            }
            log::info!("Created pattern folder {:?}", folder);
        }

        let default = folder.join(DEFAULT_PATTERN);
        if !default.exists() {
            fs::write(&default, DEFAULT_PATTERN_TEXT)?;
            log::info!("Wrote default pattern {:?}", default);
        }

        Ok(Self { folder })
    }
}

impl PatternSource for Directory {
    fn list(&self) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.folder)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        Ok(names)
    }

    fn read(&self, name: &str) -> io::Result<String> {
        fs::read_to_string(self.folder.join(name))
    }
}

/// The selectable pattern files and a decode cache keyed by file name.
///
/// Cache entries are filled on first parse and kept for the lifetime of the
/// library, even if the file changes on disk.
pub struct PatternLibrary<S = Directory> {
    source: S,
    files: VecDeque<String>,
    cache: HashMap<String, Rc<[Position]>>,
}

impl PatternLibrary<Directory> {
    pub fn open(folder: impl AsRef<Path>) -> io::Result<Self> {
        Self::new(Directory::open(folder)?)
    }
}

impl<S: PatternSource> PatternLibrary<S> {
    /// Lists the `.cells` and `.rle` files of `source`, sorted by name, with
    /// [`DEFAULT_PATTERN`] selected when it exists.
    pub fn new(source: S) -> io::Result<Self> {
        let mut files: Vec<String> = source
            .list()?
            .into_iter()
            .filter(|name| PatternFormat::from_name(name).is_some())
            .collect();
        files.sort();

        let mut files = VecDeque::from(files);
        if let Some(default) = files.iter().position(|name| name == DEFAULT_PATTERN) {
            files.rotate_left(default);
        }
        log::info!("Found {} pattern files", files.len());

        Ok(Self {
            source,
            files,
            cache: HashMap::new(),
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(String::as_str)
    }

    pub fn selected(&self) -> Option<&str> {
        self.files.front().map(String::as_str)
    }

    /// Moves the selection: `+1` selects the next file, `-1` the previous one.
    pub fn rotate(&mut self, direction: isize) {
        if self.files.is_empty() {
            return;
        }
        let steps = direction.unsigned_abs() % self.files.len();
        if direction > 0 {
            self.files.rotate_left(steps);
        } else {
            self.files.rotate_right(steps);
        }
    }

    /// Offsets of the selected pattern. Empty when there is nothing to select.
    pub fn parse(&mut self) -> Result<Rc<[Position]>, PatternError> {
        match self.files.front().cloned() {
            Some(name) => self.parse_named(&name),
            None => Ok(Rc::from(Vec::new())),
        }
    }

    /// Offsets of pattern `name`, decoded once and then served from the cache.
    pub fn parse_named(&mut self, name: &str) -> Result<Rc<[Position]>, PatternError> {
        if let Some(positions) = self.cache.get(name) {
            return Ok(Rc::clone(positions));
        }

        let format = PatternFormat::from_name(name)
            .ok_or_else(|| PatternError::UnknownFormat(name.to_string()))?;
        let text = self.source.read(name).map_err(|source| PatternError::Io {
            name: name.to_string(),
            source,
        })?;
        let positions: Rc<[Position]> = decode(format, &text)?.into();

        log::debug!("Decoded {} cells from {}", positions.len(), name);
        self.cache.insert(name.to_string(), Rc::clone(&positions));
        Ok(positions)
    }

    /// The selected pattern translated so its top-left lands on `origin`.
    pub fn placement(&mut self, origin: Position) -> Result<Vec<Position>, PatternError> {
        Ok(translate(&self.parse()?, origin).collect())
    }
}

/// Moves `offsets` by `origin`. Cells that would leave the `i32` plane are dropped.
pub fn translate(offsets: &[Position], origin: Position) -> impl Iterator<Item = Position> + '_ {
    let (x, y) = origin;
    offsets
        .iter()
        .filter_map(move |&(i, j)| Some((i.checked_add(x)?, j.checked_add(y)?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// In-memory folder that counts how often each file is read.
    #[derive(Default)]
    struct Memory {
        files: HashMap<String, String>,
        reads: Cell<usize>,
    }

    impl Memory {
        fn with(files: &[(&str, &str)]) -> Self {
            Self {
                files: files
                    .iter()
                    .map(|&(name, text)| (name.to_string(), text.to_string()))
                    .collect(),
                reads: Cell::new(0),
            }
        }
    }

    impl PatternSource for Memory {
        fn list(&self) -> io::Result<Vec<String>> {
            Ok(self.files.keys().cloned().collect())
        }

        fn read(&self, name: &str) -> io::Result<String> {
            self.reads.set(self.reads.get() + 1);
            self.files
                .get(name)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, name.to_string()))
        }
    }

    fn library() -> PatternLibrary<Memory> {
        PatternLibrary::new(Memory::with(&[
            ("singular.cells", "!comment\nO\n"),
            ("glider.rle", "#N Glider\nx = 3, y = 3, rule = B3/S23\nbob$2bo$3o!\n"),
            ("highlife.rle", "x = 3, y = 1, rule = B36/S23\n3o!\n"),
            ("broken.rle", "x = wide, y = 1\no!\n"),
            ("notes.txt", "not a pattern"),
        ]))
        .unwrap()
    }

    #[test]
    fn lists_patterns_with_default_first() {
        let library = library();
        assert_eq!(library.selected(), Some("singular.cells"));
        let mut files: Vec<_> = library.files().collect();
        files.sort();
        assert_eq!(files, vec!["broken.rle", "glider.rle", "highlife.rle", "singular.cells"]);
    }

    #[test]
    fn rotate_cycles_both_ways() {
        let mut library = library();
        library.rotate(1);
        assert_eq!(library.selected(), Some("broken.rle"));
        library.rotate(-1);
        library.rotate(-1);
        assert_eq!(library.selected(), Some("highlife.rle"));
        library.rotate(4);
        assert_eq!(library.selected(), Some("highlife.rle"));
    }

    #[test]
    fn parse_is_cached() {
        let mut library = library();
        let first = library.parse().unwrap();
        assert_eq!(&*first, &[(0, 0)]);
        let second = library.parse().unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(library.source().reads.get(), 1);
    }

    #[test]
    fn each_file_has_its_own_entry() {
        let mut library = library();
        let singular = library.parse().unwrap();
        library.rotate(-1);
        library.rotate(-1);
        assert_eq!(library.selected(), Some("glider.rle"));
        let glider = library.parse().unwrap();
        assert_eq!(&*glider, &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)]);
        assert!(!Rc::ptr_eq(&singular, &glider));

        library.parse().unwrap();
        library.parse_named("singular.cells").unwrap();
        assert_eq!(library.source().reads.get(), 2);
    }

    #[test]
    fn foreign_rule_is_cached_empty() {
        let mut library = library();
        assert!(library.parse_named("highlife.rle").unwrap().is_empty());
        assert!(library.parse_named("highlife.rle").unwrap().is_empty());
        assert_eq!(library.source().reads.get(), 1);
    }

    #[test]
    fn failures_are_not_cached() {
        let mut library = library();
        assert!(matches!(
            library.parse_named("broken.rle"),
            Err(PatternError::InvalidHeader { field: "x", .. })
        ));
        assert!(library.parse_named("broken.rle").is_err());
        assert_eq!(library.source().reads.get(), 2);

        assert!(matches!(
            library.parse_named("missing.cells"),
            Err(PatternError::Io { .. })
        ));
        assert!(matches!(
            library.parse_named("notes.txt"),
            Err(PatternError::UnknownFormat(_))
        ));
    }

    #[test]
    fn placement_translates_offsets() {
        let mut library = library();
        library.rotate(1);
        library.rotate(1);
        assert_eq!(library.selected(), Some("glider.rle"));
        assert_eq!(
            library.placement((10, 20)).unwrap(),
            vec![(11, 20), (12, 21), (10, 22), (11, 22), (12, 22)]
        );
    }

    #[test]
    fn empty_library_parses_to_nothing() {
        let mut library = PatternLibrary::new(Memory::default()).unwrap();
        assert_eq!(library.selected(), None);
        library.rotate(1);
        assert!(library.parse().unwrap().is_empty());
    }

    #[test]
    fn placement_near_the_edge_of_the_plane() {
        let mut library = PatternLibrary::new(Memory::with(&[(
            "far.rle",
            "x = 2147483647, y = 1, rule = B3/S23\n2147483646bo!",
        )]))
        .unwrap();
        assert_eq!(&*library.parse().unwrap(), &[(2147483646, 0)]);
        assert_eq!(library.placement((0, 3)).unwrap(), vec![(2147483646, 3)]);
        assert!(library.placement((5, 0)).unwrap().is_empty());
    }

    #[test]
    fn translate_drops_overflowing_cells() {
        let offsets = [(0, 0), (1, 2), (i32::MAX, 0)];
        let moved: Vec<_> = translate(&offsets, (-3, i32::MAX - 1)).collect();
        assert_eq!(moved, vec![(-3, i32::MAX - 1), (i32::MAX - 3, i32::MAX - 1)]);
    }

    #[test]
    fn directory_bootstrap() {
        let folder = std::env::temp_dir().join(format!(
            "conway_life_patterns_{}_{:?}",
            std::process::id(),
            std::thread::current().id()
        ));
        let _ = fs::remove_dir_all(&folder);

        let mut library = PatternLibrary::open(&folder).unwrap();
        assert_eq!(library.selected(), Some(DEFAULT_PATTERN));
        assert_eq!(&*library.parse().unwrap(), &[(0, 0)]);
        assert_eq!(library.files().count(), Preset::ALL.len() + 1);

        // An existing folder without the default only gets the default back.
        fs::remove_file(folder.join(DEFAULT_PATTERN)).unwrap();
        fs::remove_file(folder.join(Preset::Glider.file_name())).unwrap();
        let library = PatternLibrary::open(&folder).unwrap();
        assert_eq!(library.selected(), Some(DEFAULT_PATTERN));
        assert_eq!(library.files().count(), Preset::ALL.len());

        fs::remove_dir_all(&folder).unwrap();
    }
}
