use std::path::Path;

use crate::asset;
use crate::model::Language;

/// Starter code for `lang`, shown when a session starts.
pub fn starter_code(lang: Language) -> String {
    asset::text(&format!(
        "templates/{}.{}",
        lang.lowercase(),
        lang.file_extension()
    ))
}

/// The part of the starter code that runs the solution on a sample input,
/// from the language's entry point to the end of the file.
pub fn driver_code(lang: Language) -> String {
    use Language::*;

    let marker = match lang {
        Python => "if __name__",
        Java => "public static void main",
        Cpp => "int main()",
        JavaScript => "// Test your function",
    };
    let code = starter_code(lang);
    code.find(marker)
        .map(|i| code[i..].trim_end().to_owned())
        .unwrap_or_default()
}

/// Writes the starter code to `filepath` unless the file already exists.
/// Returns `true` if the file was created.
pub fn write_if_absent(lang: Language, filepath: impl AsRef<Path>) -> fsutil::Result<bool> {
    fsutil::write_if_absent(filepath, starter_code(lang))
}

#[cfg(test)]
mod test {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_language_should_have_template() {
        for lang in Language::iter() {
            let code = starter_code(lang);
            assert!(code.contains("Your code here"), "{}", lang);
        }
        assert!(starter_code(Language::Java).contains("class Solution"));
        assert!(starter_code(Language::Python).contains("def two_sum"));
    }

    #[test]
    fn driver_should_be_the_tail_of_the_template() {
        for lang in Language::iter() {
            let driver = driver_code(lang);
            assert!(!driver.is_empty(), "{}", lang);
            assert!(starter_code(lang).trim_end().ends_with(&driver), "{}", lang);
            assert!(!driver.contains("Your code here"), "{}", lang);
        }
        assert!(driver_code(Language::Cpp).contains("for ("));
    }

    #[test]
    fn should_not_overwrite_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.py");
        fsutil::write(&path, "mine").unwrap();

        assert!(!write_if_absent(Language::Python, &path).unwrap());
        assert_eq!(fsutil::read_to_string(&path).unwrap(), "mine");

        let fresh = dir.path().join("sub/Main.java");
        assert!(write_if_absent(Language::Java, &fresh).unwrap());
        assert_eq!(fsutil::read_to_string(&fresh).unwrap(), starter_code(Language::Java));
    }
}
