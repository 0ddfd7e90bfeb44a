//! Line-oriented request writer
//!
//! A [`Session`] owns nothing but the outgoing half of an already connected
//! transport. Every method emits one protocol request, formatted exactly as
//! the server expects it. Ordering is the caller's business.

use crate::types::{root_directory, CvsError};
use std::collections::HashSet;
use std::io::Write;
use tracing::trace;

/// Local path the server uses for the working root
pub const CURRENT_LOCAL_FOLDER: &str = ".";

/// Permissions sent for files that have no recorded permissions
pub const DEFAULT_PERMISSIONS: &str = "u=rw,g=rw,o=r";

/// Permissions sent for executable files
pub const DEFAULT_EXECUTABLE_PERMISSIONS: &str = "u=rwx,g=rwx,o=rx";

/// Outgoing side of one CVS connection
pub struct Session<'w> {
    out: &'w mut dyn Write,
    repository_root: String,
    valid_requests: Option<HashSet<String>>,
}

impl<'w> Session<'w> {
    /// Create a session writing to `out` for the repository at `repository_root`
    /// (a full CVSROOT string or a bare repository directory).
    pub fn new(out: &'w mut dyn Write, repository_root: impl Into<String>) -> Self {
        Self {
            out,
            repository_root: repository_root.into(),
            valid_requests: None,
        }
    }

    /// Restrict the requests the server is known to accept.
    ///
    /// Without this every request is assumed valid.
    pub fn with_valid_requests<I, S>(mut self, requests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.valid_requests = Some(requests.into_iter().map(Into::into).collect());
        self
    }

    pub fn repository_root(&self) -> &str {
        &self.repository_root
    }

    pub fn is_valid_request(&self, request: &str) -> bool {
        self.valid_requests
            .as_ref()
            .map_or(true, |requests| requests.contains(request))
    }

    /// Write one line followed by a newline
    pub fn write_line(&mut self, line: &str) -> Result<(), CvsError> {
        trace!("C: {}", line);
        self.out.write_all(line.as_bytes())?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    /// `Argument <text>`, continuing embedded newlines on `Argumentx` lines
    pub fn send_argument(&mut self, argument: &str) -> Result<(), CvsError> {
        let mut lines = argument.split('\n');
        let first = lines.next().unwrap_or_default();
        self.write_line(&format!("Argument {first}"))?;
        for continuation in lines {
            self.write_line(&format!("Argumentx {continuation}"))?;
        }
        Ok(())
    }

    /// `Global_option <flag>`
    pub fn send_global_option(&mut self, option: &str) -> Result<(), CvsError> {
        self.write_line(&format!("Global_option {option}"))
    }

    /// Terminal request naming the command; flushes the transport
    pub fn send_request(&mut self, request: &str) -> Result<(), CvsError> {
        self.write_line(request)?;
        self.out.flush()?;
        Ok(())
    }

    /// `Directory <local>` followed by the remote repository path
    pub fn send_directory(&mut self, local: &str, remote: &str) -> Result<(), CvsError> {
        let local = if local.is_empty() {
            CURRENT_LOCAL_FOLDER
        } else {
            local
        };
        self.write_line(&format!("Directory {local}"))?;
        self.write_line(remote)
    }

    /// Directory whose remote path is guessed from its local path.
    ///
    /// Only valid for folders the repository does not know yet. A root with
    /// a trailing slash yields `//` in the remote path, which servers accept.
    pub fn send_constructed_directory(&mut self, local: &str) -> Result<(), CvsError> {
        let remote = format!("{}/{}", root_directory(&self.repository_root), local);
        self.send_directory(local, &remote)
    }

    /// Constructed directory for the working root itself
    pub fn send_constructed_root_directory(&mut self) -> Result<(), CvsError> {
        self.send_constructed_directory("")
    }

    /// Marks the last announced directory as static
    pub fn send_static_directory(&mut self) -> Result<(), CvsError> {
        self.write_line("Static-directory")
    }

    /// Sticky tag or date of the last announced directory
    pub fn send_sticky(&mut self, tag: &str) -> Result<(), CvsError> {
        self.write_line(&format!("Sticky {tag}"))
    }

    /// `Entry <line>` for a file the server already tracks
    pub fn send_entry(&mut self, entry_line: &str) -> Result<(), CvsError> {
        self.write_line(&format!("Entry {entry_line}"))
    }

    /// `Questionable <name>` for an unmanaged local file
    pub fn send_questionable(&mut self, name: &str) -> Result<(), CvsError> {
        self.write_line(&format!("Questionable {name}"))
    }

    /// `Unchanged <name>` for a clean tracked file
    pub fn send_unchanged(&mut self, name: &str) -> Result<(), CvsError> {
        self.write_line(&format!("Unchanged {name}"))
    }

    /// `Is-modified <name>`: modified, contents withheld
    pub fn send_is_modified(&mut self, name: &str) -> Result<(), CvsError> {
        self.write_line(&format!("Is-modified {name}"))
    }

    /// `Modified <name>`, permissions, byte count, then the raw contents.
    ///
    /// Text contents get CRLF line ends folded to LF on CRLF platforms; the
    /// byte count always describes what is actually written.
    pub fn send_modified(
        &mut self,
        name: &str,
        permissions: &str,
        contents: &[u8],
        binary: bool,
    ) -> Result<(), CvsError> {
        self.write_line(&format!("Modified {name}"))?;
        self.write_line(permissions)?;

        let translated;
        let body = if !binary && cfg!(windows) {
            translated = crlf_to_lf(contents);
            translated.as_slice()
        } else {
            contents
        };

        self.write_line(&body.len().to_string())?;
        trace!("C: <{} bytes of {}>", body.len(), name);
        self.out.write_all(body)?;
        Ok(())
    }
}

fn crlf_to_lf(contents: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(contents.len());
    let mut iter = contents.iter().peekable();
    while let Some(&byte) = iter.next() {
        if byte == b'\r' && iter.peek() == Some(&&b'\n') {
            continue;
        }
        out.push(byte);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(f: impl FnOnce(&mut Session<'_>) -> Result<(), CvsError>) -> String {
        let mut wire = Vec::new();
        {
            let mut session = Session::new(&mut wire, ":pserver:anon@cvs.example.org:/cvsroot");
            f(&mut session).expect("write should succeed");
        }
        String::from_utf8(wire).expect("wire is utf-8")
    }

    #[test]
    fn test_argument_continuation_lines() {
        let text = written(|s| s.send_argument("Hello\nWorld\n  Hello World"));
        assert_eq!(
            text,
            "Argument Hello\nArgumentx World\nArgumentx   Hello World\n"
        );
    }

    #[test]
    fn test_directory_for_root_uses_dot() {
        let text = written(|s| s.send_directory("", "/cvsroot/project"));
        assert_eq!(text, "Directory .\n/cvsroot/project\n");
    }

    #[test]
    fn test_constructed_directory() {
        let text = written(|s| {
            s.send_constructed_root_directory()?;
            s.send_constructed_directory("src/util")
        });
        assert_eq!(
            text,
            "Directory .\n/cvsroot/\nDirectory src/util\n/cvsroot/src/util\n"
        );
    }

    #[test]
    fn test_modified_transmission() {
        let text = written(|s| s.send_modified("a.txt", DEFAULT_PERMISSIONS, b"one\ntwo\n", false));
        assert_eq!(text, "Modified a.txt\nu=rw,g=rw,o=r\n8\none\ntwo\n");
    }

    #[test]
    fn test_short_requests() {
        let text = written(|s| {
            s.send_global_option("-n")?;
            s.send_entry("/a.txt/1.1///")?;
            s.send_unchanged("a.txt")?;
            s.send_questionable("b.txt")?;
            s.send_is_modified("c.txt")?;
            s.send_static_directory()?;
            s.send_sticky("Tbranch")?;
            s.send_request("update")
        });
        assert_eq!(
            text,
            "Global_option -n\nEntry /a.txt/1.1///\nUnchanged a.txt\nQuestionable b.txt\n\
             Is-modified c.txt\nStatic-directory\nSticky Tbranch\nupdate\n"
        );
    }

    #[test]
    fn test_valid_requests() {
        let mut wire = Vec::new();
        let session = Session::new(&mut wire, "/cvs").with_valid_requests(["Entry", "Modified"]);
        assert!(session.is_valid_request("Entry"));
        assert!(!session.is_valid_request("Is-modified"));

        let mut wire = Vec::new();
        let session = Session::new(&mut wire, "/cvs");
        assert!(session.is_valid_request("Is-modified"));
    }

    #[test]
    fn test_crlf_to_lf() {
        assert_eq!(crlf_to_lf(b"a\r\nb\r\n\rc"), b"a\nb\n\rc".to_vec());
    }
}
