use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;

use image::RgbaImage;

use crate::error::ContentError;

/// Directory, relative to the working directory, that games load assets from.
pub const CONTENT_ROOT: &str = "Content";

/// Loads game assets from a root directory and caches them by name.
///
/// Asset names are relative paths such as `"sprites/player.png"`. Loaded
/// assets are shared as `Rc` and stay cached until [`unload`](Self::unload).
#[derive(Debug)]
pub struct ContentManager {
    base_dir: PathBuf,
    root_directory: PathBuf,
    bytes: RefCell<HashMap<String, Rc<[u8]>>>,
    images: RefCell<HashMap<String, Rc<RgbaImage>>>,
}

impl ContentManager {
    /// Creates a manager resolving against `base_dir` with an empty root.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            root_directory: PathBuf::new(),
            bytes: RefCell::default(),
            images: RefCell::default(),
        }
    }

    /// Root directory relative to the base directory.
    pub fn root_directory(&self) -> &Path {
        &self.root_directory
    }

    /// Changes the root; cached assets are kept under their names.
    pub fn set_root_directory(&mut self, root: impl Into<PathBuf>) {
        self.root_directory = root.into();
    }

    /// Full path `name` resolves to.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, ContentError> {
        let rel = Path::new(name);
        // Path::components drops a trailing "." or separator, so check the raw last segment.
        let names_a_file = name
            .rsplit(['/', '\\'])
            .next()
            .is_some_and(|last| !last.is_empty() && last != "." && last != "..");
        let valid = names_a_file
            && rel
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !valid {
            return Err(ContentError::InvalidName(name.to_string()));
        }

        Ok(self.base_dir.join(&self.root_directory).join(rel))
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.bytes.borrow().contains_key(name) || self.images.borrow().contains_key(name)
    }

    /// Raw file contents.
    pub fn load_bytes(&self, name: &str) -> Result<Rc<[u8]>, ContentError> {
        if let Some(hit) = self.bytes.borrow().get(name) {
            return Ok(Rc::clone(hit));
        }

        let path = self.resolve(name)?;
        let data: Rc<[u8]> = std::fs::read(&path)
            .map_err(|source| ContentError::Io {
                name: name.to_string(),
                path: path.clone(),
                source,
            })?
            .into();

        log::debug!("loaded asset {name:?} ({} bytes) from {}", data.len(), path.display());
        self.bytes.borrow_mut().insert(name.to_string(), Rc::clone(&data));
        Ok(data)
    }

    /// File contents decoded as UTF-8.
    pub fn load_string(&self, name: &str) -> Result<String, ContentError> {
        let data = self.load_bytes(name)?;
        let text = std::str::from_utf8(&data).map_err(|source| ContentError::Utf8 {
            name: name.to_string(),
            source,
        })?;
        Ok(text.to_string())
    }

    /// Image decoded to RGBA8 (PNG, JPEG or BMP).
    pub fn load_image(&self, name: &str) -> Result<Rc<RgbaImage>, ContentError> {
        if let Some(hit) = self.images.borrow().get(name) {
            return Ok(Rc::clone(hit));
        }

        // Encoded bytes are not worth keeping once decoded.
        let path = self.resolve(name)?;
        let data = std::fs::read(&path).map_err(|source| ContentError::Io {
            name: name.to_string(),
            path,
            source,
        })?;
        let image = image::load_from_memory(&data)
            .map_err(|source| ContentError::Image {
                name: name.to_string(),
                source,
            })?
            .to_rgba8();

        log::debug!("decoded image {name:?} ({}x{})", image.width(), image.height());
        let image = Rc::new(image);
        self.images.borrow_mut().insert(name.to_string(), Rc::clone(&image));
        Ok(image)
    }

    /// Drops every cached asset. Handles already given out stay valid.
    pub fn unload(&self) {
        let count = self.bytes.borrow().len() + self.images.borrow().len();
        self.bytes.borrow_mut().clear();
        self.images.borrow_mut().clear();
        log::debug!("unloaded {count} assets");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content_dir() -> (tempfile::TempDir, ContentManager) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(CONTENT_ROOT).join("text")).unwrap();
        let mut content = ContentManager::new(dir.path());
        content.set_root_directory(CONTENT_ROOT);
        (dir, content)
    }

    #[test]
    fn resolves_under_base_and_root() {
        let content = {
            let mut c = ContentManager::new("/games/demo");
            c.set_root_directory(CONTENT_ROOT);
            c
        };
        assert_eq!(
            content.resolve("maps/level1.txt").unwrap(),
            PathBuf::from("/games/demo/Content/maps/level1.txt")
        );
    }

    #[test]
    fn rejects_names_leaving_the_root_or_naming_a_directory() {
        let (_dir, content) = content_dir();
        for bad in ["", ".", "text/", "text/.", "../secret.txt", "text/../../x", "/etc/passwd"] {
            assert!(
                matches!(content.resolve(bad), Err(ContentError::InvalidName(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn loads_text_and_caches_it() {
        let (dir, content) = content_dir();
        let path = dir.path().join("Content/text/hello.txt");
        std::fs::write(&path, "hello echo").unwrap();

        assert!(!content.is_loaded("text/hello.txt"));
        assert_eq!(content.load_string("text/hello.txt").unwrap(), "hello echo");
        assert!(content.is_loaded("text/hello.txt"));

        // Served from cache even after the file is gone.
        std::fs::remove_file(&path).unwrap();
        let a = content.load_bytes("text/hello.txt").unwrap();
        let b = content.load_bytes("text/hello.txt").unwrap();
        assert!(Rc::ptr_eq(&a, &b));

        content.unload();
        assert!(!content.is_loaded("text/hello.txt"));
        assert!(matches!(
            content.load_bytes("text/hello.txt"),
            Err(ContentError::Io { .. })
        ));
    }

    #[test]
    fn invalid_utf8_is_reported() {
        let (dir, content) = content_dir();
        std::fs::write(dir.path().join("Content/blob.bin"), [0xff, 0xfe, 0x00]).unwrap();
        assert!(matches!(content.load_string("blob.bin"), Err(ContentError::Utf8 { .. })));
    }

    #[test]
    fn decodes_png() {
        let (dir, content) = content_dir();
        let img = RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        img.save(dir.path().join("Content/dot.png")).unwrap();

        let loaded = content.load_image("dot.png").unwrap();
        assert_eq!(loaded.dimensions(), (3, 2));
        assert_eq!(loaded.get_pixel(2, 1).0, [10, 20, 30, 255]);
        assert!(content.is_loaded("dot.png"));
    }

    #[test]
    fn garbage_image_is_a_decode_error() {
        let (dir, content) = content_dir();
        std::fs::write(dir.path().join("Content/bad.png"), b"not a png").unwrap();
        assert!(matches!(content.load_image("bad.png"), Err(ContentError::Image { .. })));
    }
}
