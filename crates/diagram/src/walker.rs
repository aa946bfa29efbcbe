//! 有序后序目录遍历

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// 已列出条目的目录
#[derive(Debug, Clone)]
pub struct DirectoryNode {
    pub directory: PathBuf,
    /// 直接子目录，按名称排序
    pub sub_directories: Vec<PathBuf>,
    /// 本目录的文件，按名称排序
    pub files: Vec<PathBuf>,
}

impl DirectoryNode {
    fn read(directory: &Path, extension: Option<&str>) -> io::Result<Self> {
        let mut sub_directories = Vec::new();
        let mut files = Vec::new();

        for entry in fs::read_dir(directory)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let path = entry.path();
            if file_type.is_dir() {
                sub_directories.push(path);
            } else if file_type.is_symlink() && path.is_dir() {
                // 不跟随目录符号链接
                tracing::debug!("Skipping directory link {}", path.display());
            } else if extension.map_or(true, |ext| path.extension().is_some_and(|e| e == ext)) {
                files.push(path);
            }
        }

        sub_directories.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        Ok(Self {
            directory: directory.to_path_buf(),
            sub_directories,
            files,
        })
    }

    pub fn name(&self) -> String {
        file_name(&self.directory)
    }

    /// 直接子目录名称，按遍历顺序
    pub fn sub_directory_names(&self) -> Vec<String> {
        self.sub_directories.iter().map(|dir| file_name(dir)).collect()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}

struct Frame {
    node: DirectoryNode,
    next_sub_directory: usize,
    next_file: usize,
}

/// 深度优先遍历源码树，惰性产出文件
///
/// 目录内先完整访问每个子目录（包括其 `on_leave`），再产出本目录文件。
/// 消费方请求最后一个文件之后的条目时触发本目录的 `on_leave`。
/// 同级按名称排序，只能遍历一次。
pub struct SortedFileTreeWalker<F>
where
    F: FnMut(&DirectoryNode),
{
    stack: Vec<Frame>,
    pending_root: Option<PathBuf>,
    extension: Option<String>,
    on_leave: F,
    failed: bool,
}

impl<F> SortedFileTreeWalker<F>
where
    F: FnMut(&DirectoryNode),
{
    pub fn new(root: impl Into<PathBuf>, on_leave: F) -> Self {
        Self {
            stack: Vec::new(),
            pending_root: Some(root.into()),
            extension: None,
            on_leave,
            failed: false,
        }
    }

    /// 只产出该扩展名的文件（不含点）
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = Some(extension.to_string());
        self
    }

    fn enter(&mut self, directory: &Path) -> io::Result<()> {
        let node = DirectoryNode::read(directory, self.extension.as_deref())?;
        self.stack.push(Frame {
            node,
            next_sub_directory: 0,
            next_file: 0,
        });
        Ok(())
    }
}

impl<F> Iterator for SortedFileTreeWalker<F>
where
    F: FnMut(&DirectoryNode),
{
    type Item = io::Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        if let Some(root) = self.pending_root.take() {
            if let Err(e) = self.enter(&root) {
                self.failed = true;
                return Some(Err(e));
            }
        }

        loop {
            let frame = self.stack.last_mut()?;

            if let Some(sub_directory) = frame.node.sub_directories.get(frame.next_sub_directory) {
                let sub_directory = sub_directory.clone();
                frame.next_sub_directory += 1;
                if let Err(e) = self.enter(&sub_directory) {
                    self.failed = true;
                    return Some(Err(e));
                }
                continue;
            }

            if let Some(file) = frame.node.files.get(frame.next_file) {
                frame.next_file += 1;
                return Some(Ok(file.clone()));
            }

            if let Some(finished) = self.stack.pop() {
                (self.on_leave)(&finished.node);
            }
        }
    }
}

/// `path` 相对 `base` 的路径，所有平台都用 "/" 连接
///
/// 两者相同时为空
pub fn relative_forward_slash(path: &Path, base: &Path) -> String {
    let path_components: Vec<_> = path.components().collect();
    let base_components: Vec<_> = base.components().collect();
    let common = path_components
        .iter()
        .zip(base_components.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let ups = std::iter::repeat("..".to_string()).take(base_components.len() - common);
    let downs = path_components[common..]
        .iter()
        .map(|component| component.as_os_str().to_string_lossy().to_string());

    ups.chain(downs).collect::<Vec<_>>().join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::tempdir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_walk_order_is_sorted_post_order() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(root, "b/y.kt");
        touch(root, "a/x.kt");
        touch(root, "a/deep/z.kt");
        touch(root, "root.kt");
        fs::create_dir_all(root.join("a/empty")).unwrap();

        let events = RefCell::new(Vec::new());
        let files: Vec<_> = SortedFileTreeWalker::new(root, |node: &DirectoryNode| {
            events
                .borrow_mut()
                .push(format!("leave:{}", relative_forward_slash(&node.directory, root)));
        })
        .map(|file| {
            let file = file.unwrap();
            let relative = relative_forward_slash(&file, root);
            events.borrow_mut().push(format!("file:{relative}"));
            relative
        })
        .collect();

        assert_eq!(files, vec!["a/deep/z.kt", "a/x.kt", "b/y.kt", "root.kt"]);
        assert_eq!(
            events.into_inner(),
            vec![
                "file:a/deep/z.kt",
                "leave:a/deep",
                "leave:a/empty",
                "file:a/x.kt",
                "leave:a",
                "file:b/y.kt",
                "leave:b",
                "file:root.kt",
                "leave:",
            ]
        );
    }

    #[test]
    fn test_extension_filter_and_child_names() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(root, "pkg/A.kt");
        touch(root, "pkg/notes.txt");
        fs::create_dir_all(root.join("pkg/zeta")).unwrap();
        fs::create_dir_all(root.join("pkg/alpha")).unwrap();

        let children = RefCell::new(Vec::new());
        let files: Vec<_> = SortedFileTreeWalker::new(root, |node: &DirectoryNode| {
            if node.name() == "pkg" {
                children.borrow_mut().extend(node.sub_directory_names());
            }
        })
        .with_extension("kt")
        .map(|file| file.unwrap())
        .collect();

        assert_eq!(files, vec![root.join("pkg/A.kt")]);
        assert_eq!(children.into_inner(), vec!["alpha", "zeta"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_links_are_not_followed() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(root, "a/A.kt");
        std::os::unix::fs::symlink(root.join("a"), root.join("a/loop")).unwrap();

        let left = RefCell::new(Vec::new());
        let files: Vec<_> = SortedFileTreeWalker::new(root, |node: &DirectoryNode| {
            left.borrow_mut().push(relative_forward_slash(&node.directory, root));
        })
        .map(|file| relative_forward_slash(&file.unwrap(), root))
        .collect();

        assert_eq!(files, vec!["a/A.kt"]);
        assert_eq!(left.into_inner(), vec!["a", ""]);
    }

    #[test]
    fn test_missing_root_yields_error_once() {
        let dir = tempdir().unwrap();
        let mut walker = SortedFileTreeWalker::new(dir.path().join("missing"), |_: &DirectoryNode| {});
        assert!(matches!(walker.next(), Some(Err(_))));
        assert!(walker.next().is_none());
    }

    #[test]
    fn test_relative_forward_slash() {
        let base = Path::new("/project/src");
        assert_eq!(relative_forward_slash(Path::new("/project/src/com/app"), base), "com/app");
        assert_eq!(relative_forward_slash(base, base), "");
        assert_eq!(relative_forward_slash(Path::new("/project/docs"), base), "../docs");
    }
}
