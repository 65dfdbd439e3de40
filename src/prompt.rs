use std::io::{self, BufRead, Write};
use std::time::{SystemTime, UNIX_EPOCH};

const LOGO: [&str; 10] = [
    "==========================",
    "                _         ",
    "               | |        ",
    "      _ __  ___| |__      ",
    "     | '_ \\/ __| '_ \\     ",
    "     | |_) \\__ \\ | | |    ",
    "     | .__/|___/_| |_|    ",
    "     | |                  ",
    "     |_|                  ",
    "==========================",
];

const GREEN: &str = "\x1b[0;32;40m";
const WHITE: &str = "\x1b[0;37;40m";

/// The banner shown once at startup: the logo and the local time `now`.
pub fn greeting(now: SystemTime) -> String {
    let mut text = LOGO.join("\n");
    text.push('\n');
    text.push_str(&format_timestamp(now));
    text.push('\n');
    text
}

pub fn render_prompt(prompt: &str) -> String {
    format!("{}{}{}", GREEN, prompt, WHITE)
}

/// `ctime`-style local time, e.g. `Sun Sep  9 03:46:40 2001`.
pub fn format_timestamp(now: SystemTime) -> String {
    let secs = now
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as libc::time_t)
        .unwrap_or(0);

    let mut tm: libc::tm = unsafe { std::mem::zeroed() };
    if unsafe { libc::localtime_r(&secs, &mut tm) }.is_null() {
        return secs.to_string();
    }

    let mut buf = [0u8; 64];
    let len = unsafe {
        libc::strftime(
            buf.as_mut_ptr().cast(),
            buf.len(),
            c"%a %b %e %H:%M:%S %Y".as_ptr(),
            &tm,
        )
    };
    String::from_utf8_lossy(&buf[..len]).into_owned()
}

pub struct ShellPrompt {
    text: String,
}

impl ShellPrompt {
    pub fn new(prompt: &str) -> Self {
        ShellPrompt {
            text: render_prompt(prompt),
        }
    }

    pub fn show_prompt<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(self.text.as_bytes())?;
        out.flush()
    }

    /// `None` at end of input (e.g. Ctrl-D). Bytes that are not UTF-8
    /// come back as U+FFFD, which the lexer rejects for that line only.
    pub fn read_line<R: BufRead>(&self, input: &mut R) -> io::Result<Option<String>> {
        let mut buf = Vec::new();
        let bytes_read = input.read_until(b'\n', &mut buf)?;
        if bytes_read == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;

    #[test]
    fn test_format_timestamp() {
        // 2001-09-09T01:46:40Z, still 2001 in every time zone
        let now = UNIX_EPOCH + Duration::from_secs(1_000_000_000);
        let stamp = format_timestamp(now);
        assert!(stamp.ends_with("2001"), "{}", stamp);
        assert!(stamp.contains("Sep"), "{}", stamp);
        assert_eq!(stamp.split_whitespace().count(), 5);
    }

    #[test]
    fn test_greeting_is_deterministic() {
        let now = UNIX_EPOCH + Duration::from_secs(1_000_000_000);
        let text = greeting(now);
        assert_eq!(text, greeting(now));
        assert!(text.starts_with(LOGO[0]));
        assert!(text.ends_with(&format!("{}\n", format_timestamp(now))));
    }

    #[test]
    fn test_render_prompt() {
        assert_eq!(render_prompt("psh-$ "), "\x1b[0;32;40mpsh-$ \x1b[0;37;40m");
    }

    #[test]
    fn test_read_line() {
        let prompt = ShellPrompt::new("$ ");
        let mut input = Cursor::new("ls -la\nwc");
        assert_eq!(prompt.read_line(&mut input).unwrap().as_deref(), Some("ls -la\n"));
        assert_eq!(prompt.read_line(&mut input).unwrap().as_deref(), Some("wc"));
        assert_eq!(prompt.read_line(&mut input).unwrap(), None);

        let mut input = Cursor::new(&b"echo \xff\nls\n"[..]);
        assert_eq!(
            prompt.read_line(&mut input).unwrap().as_deref(),
            Some("echo \u{fffd}\n")
        );
        assert_eq!(prompt.read_line(&mut input).unwrap().as_deref(), Some("ls\n"));

        let mut out = Vec::new();
        prompt.show_prompt(&mut out).unwrap();
        assert_eq!(out, render_prompt("$ ").into_bytes());
    }
}
