//! Turns an untrusted name into something safe to use as a file-name component.

/// Longest name, in characters, that `sanitize_file_name` will return.
pub const MAX_NAME_CHARS: usize = 100;

const UNSAFE_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Cleans `name` for use as a file-name stem.
///
/// Path separators, `: * ? " < > |` and control characters (DEL included)
/// become `_`, surrounding whitespace is trimmed, a leading `.` becomes `_`
/// and the result is cut to [`MAX_NAME_CHARS`] characters. An empty return
/// value means the name carries nothing usable.
pub fn sanitize_file_name(name: &str) -> String {
  let replaced: String = name
    .chars()
    .map(|c| {
      if UNSAFE_CHARS.contains(&c) || c.is_control() {
        '_'
      } else {
        c
      }
    })
    .collect();

  let trimmed = replaced.trim();
  if trimmed.chars().all(|c| c == '.' || c == '_') {
    return String::new();
  }

  let mut cleaned = String::with_capacity(trimmed.len());
  if let Some(rest) = trimmed.strip_prefix('.') {
    cleaned.push('_');
    cleaned.push_str(rest);
  } else {
    cleaned.push_str(trimmed);
  }

  cleaned.chars().take(MAX_NAME_CHARS).collect()
}
