//! Validation results
//!
//! A value paired with accumulated error messages. Every layer of the parser
//! reports expected failures through this type instead of `Result`, so the
//! caller always receives a best-effort value.

use std::fmt;

/// A value plus zero or more error messages
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult<T> {
    value: T,
    errors: Vec<String>,
}

impl<T> ValidationResult<T> {
    /// A successful result
    pub fn success(value: T) -> Self {
        Self { value, errors: Vec::new() }
    }

    /// An errored result carrying a fallback value
    pub fn error(value: T, message: impl fmt::Display) -> Self {
        Self { value, errors: vec![message.to_string()] }
    }

    /// A result carrying the given messages; successful if `errors` is empty
    pub fn with_errors(value: T, errors: Vec<String>) -> Self {
        Self {
            value,
            errors: errors.into_iter().filter(|e| !e.is_empty()).collect(),
        }
    }

    /// Success if `valid`, otherwise an error with `message`
    pub fn predicated(value: T, valid: bool, message: impl fmt::Display) -> Self {
        if valid {
            Self::success(value)
        } else {
            Self::error(value, message)
        }
    }

    pub fn is_error(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn into_parts(self) -> (T, Vec<String>) {
        (self.value, self.errors)
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// All messages joined into one string; empty for a success
    pub fn error_text(&self) -> String {
        self.errors.join("; ")
    }

    /// Append a message
    pub fn add_error(&mut self, message: impl fmt::Display) {
        let message = message.to_string();
        if !message.is_empty() {
            self.errors.push(message);
        }
    }

    /// Append the messages of another result, discarding its value
    pub fn absorb<U>(&mut self, other: ValidationResult<U>) -> U {
        self.errors.extend(other.errors);
        other.value
    }

    /// Copy this result's messages into `sink`
    pub fn write_errors(&self, sink: &mut Vec<String>) {
        sink.extend(self.errors.iter().cloned());
    }

    /// Transform the value, keeping the messages
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ValidationResult<U> {
        ValidationResult { value: f(self.value), errors: self.errors }
    }

    /// Chain a computation whose messages are appended to this result's
    pub fn and_then<U>(self, f: impl FnOnce(T) -> ValidationResult<U>) -> ValidationResult<U> {
        let mut next = f(self.value);
        let mut errors = self.errors;
        errors.append(&mut next.errors);
        ValidationResult { value: next.value, errors }
    }

    /// Combine two results, concatenating their messages
    pub fn combine<U, R>(
        self,
        other: ValidationResult<U>,
        f: impl FnOnce(T, U) -> R,
    ) -> ValidationResult<R> {
        let mut errors = self.errors;
        errors.extend(other.errors);
        ValidationResult { value: f(self.value, other.value), errors }
    }
}

impl<T: Default> ValidationResult<T> {
    /// An errored result carrying `T::default()`
    pub fn failure(message: impl fmt::Display) -> Self {
        Self::error(T::default(), message)
    }
}

impl<T> From<T> for ValidationResult<T> {
    fn from(value: T) -> Self {
        Self::success(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_and_error() {
        let ok = ValidationResult::success(1);
        assert!(ok.is_valid());
        assert_eq!(ok.error_text(), "");

        let err = ValidationResult::error(2, "bad");
        assert!(err.is_error());
        assert_eq!(*err.get(), 2);
        assert_eq!(err.error_text(), "bad");
    }

    #[test]
    fn test_predicated() {
        assert!(ValidationResult::predicated(0, true, "nope").is_valid());
        let r = ValidationResult::predicated(0, false, "nope");
        assert_eq!(r.errors(), &["nope".to_string()]);
    }

    #[test]
    fn test_empty_message_is_not_an_error() {
        let r = ValidationResult::with_errors(0, vec![String::new()]);
        assert!(r.is_valid());
        let mut r = ValidationResult::success(0);
        r.add_error("");
        assert!(r.is_valid());
    }

    #[test]
    fn test_combine_concatenates() {
        let a = ValidationResult::error(1, "first");
        let b = ValidationResult::error(2, "second");
        let c = a.combine(b, |x, y| x + y);
        assert_eq!(*c.get(), 3);
        assert_eq!(c.error_text(), "first; second");
    }

    #[test]
    fn test_and_then_keeps_earlier_errors() {
        let r = ValidationResult::error(1, "early").and_then(|v| ValidationResult::error(v * 10, "late"));
        assert_eq!(*r.get(), 10);
        assert_eq!(r.errors().len(), 2);
    }

    #[test]
    fn test_absorb() {
        let mut outer = ValidationResult::success(Vec::<i32>::new());
        let inner = ValidationResult::error(5, "inner failed");
        let value = outer.absorb(inner);
        assert_eq!(value, 5);
        assert!(outer.is_error());
    }
}
