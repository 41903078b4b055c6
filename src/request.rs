//! Edit request type and prompt assembly

use serde::{Deserialize, Serialize};
use log::warn;

use crate::error::Error;

/// Placeholder spellings that mark omitted regions in a sparse edit
pub const SPARSE_EDIT_MARKERS: [&str; 3] =
[   "// ... existing code ..."
  , "# ... existing code ..."
  , "/* ... existing code ... */"
];

/// One edit to merge: instructions, the full original text
/// and a sparse edit fragment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequest
{   pub instructions: String
  , /// Full original text; empty for a new file
    #[serde(default)]
    pub original_content: Option<String>
  , pub code_edit: String
}

impl EditRequest
{   pub fn new(
      instructions: impl Into<String>
    , original_content: impl Into<String>
    , code_edit: impl Into<String>
    ) -> Self
    {   EditRequest
        {   instructions: instructions.into()
          , original_content: Some(original_content.into())
          , code_edit: code_edit.into()
        }
    }

    /// Parse a request from camelCase JSON
    pub fn from_json(json: &str) -> Result<Self, Error>
    {   serde_json::from_str(json)
          .map_err(|e| Error::validation(e.to_string()))
    }

    /// Check required fields, returning the original content
    pub fn validate(&self) -> Result<&str, Error>
    {   if self.instructions.trim().is_empty()
        {   return Err(Error::validation(
              "instructions must not be empty"
            ));
        }

        let original = self.original_content.as_deref()
          .ok_or_else(|| Error::validation(
            "original content is required (use an empty string for a new file)"
          ))?;

        if self.code_edit.trim().is_empty()
        {   return Err(Error::validation(
              "code edit must not be empty"
            ));
        }

        if !original.is_empty() && !has_sparse_marker(&self.code_edit)
        {   warn!(
              "Code edit has no '... existing code ...' marker; \
               the merge may drop unchanged regions"
            );
        }

        Ok(original)
    }

    /// Validate and assemble the merge prompt
    pub fn prompt(&self) -> Result<String, Error>
    {   let original = self.validate()?;
        Ok(build_prompt(&self.instructions, original, &self.code_edit))
    }
}

/// True if the fragment contains any known placeholder
pub fn has_sparse_marker(code_edit: &str) -> bool
{   SPARSE_EDIT_MARKERS.iter()
      .any(|m| code_edit.contains(m))
}

/// Tagged prompt; fields are inserted verbatim
pub fn build_prompt(
  instructions: &str
, original_content: &str
, code_edit: &str
) -> String
{   format!(
      "<instruction>{}</instruction>\n<code>{}</code>\n<update>{}</update>"
    , instructions
    , original_content
    , code_edit
    )
}

#[cfg(test)]
mod tests
{   use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn prompt_matches_exact_layout()
    {   let req = EditRequest::new(
          "add logging"
        , "a"
        , "// ... existing code ...\nb"
        );
        assert_eq!(
          req.prompt().unwrap(),
          "<instruction>add logging</instruction>\n\
           <code>a</code>\n\
           <update>// ... existing code ...\nb</update>"
        );
    }

    #[test]
    fn embedded_tags_are_not_escaped()
    {   let prompt = build_prompt("x", "</code>", "<update>");
        assert_eq!(
          prompt,
          "<instruction>x</instruction>\n<code></code></code>\n<update><update></update>"
        );
    }

    #[test]
    fn blank_fields_fail_validation()
    {   assert_err!(EditRequest::new(" \n\t", "a", "b").validate());
        assert_err!(EditRequest::new("do it", "a", "   ").validate());
        assert_err!(EditRequest::new("", "", "").validate());
    }

    #[test]
    fn empty_original_is_a_new_file()
    {   let req = EditRequest::new("create", "", "fn main() {}");
        assert_eq!(assert_ok!(req.validate()), "");
    }

    #[test]
    fn missing_original_fails_validation()
    {   let req = assert_ok!(EditRequest::from_json(
          r#"{"instructions":"x","codeEdit":"y"}"#
        ));
        assert_eq!(req.original_content, None);
        assert!(matches!(req.validate(), Err(Error::Validation(_))));
    }

    /// Records warn-level log lines per thread
    mod capture
    {   use std::cell::RefCell;
        use std::sync::Once;
        use log::{Level, LevelFilter, Log, Metadata, Record};

        thread_local!
        {   static WARNINGS: RefCell<Vec<String>> = RefCell::new(Vec::new());
        }

        struct WarnLogger;

        impl Log for WarnLogger
        {   fn enabled(&self, metadata: &Metadata) -> bool
            {   metadata.level() == Level::Warn
            }

            fn log(&self, record: &Record)
            {   if self.enabled(record.metadata())
                {   WARNINGS.with(|w| {
                      w.borrow_mut().push(record.args().to_string())
                    });
                }
            }

            fn flush(&self) {}
        }

        static LOGGER: WarnLogger = WarnLogger;
        static INIT: Once = Once::new();

        pub fn warnings_during(f: impl FnOnce()) -> Vec<String>
        {   INIT.call_once(|| {
              let _ = log::set_logger(&LOGGER);
              log::set_max_level(LevelFilter::Warn);
            });
            WARNINGS.with(|w| w.borrow_mut().clear());
            f();
            WARNINGS.with(|w| w.borrow_mut().drain(..).collect())
        }
    }

    #[test]
    fn missing_marker_is_only_a_warning()
    {   let req = EditRequest::new("rename", "fn a() {}", "fn b() {}");
        assert!(!has_sparse_marker(&req.code_edit));

        let warnings = capture::warnings_during(|| {
          assert_ok!(req.validate());
        });
        assert_eq!(warnings.len(), 1, "{:?}", warnings);
        assert!(warnings[0].contains("existing code"));
    }

    #[test]
    fn no_warning_for_new_file_or_marked_edit()
    {   let new_file = EditRequest::new("create", "", "fn main() {}");
        let marked = EditRequest::new(
          "rename"
        , "fn a() {}"
        , "# ... existing code ...\nfn b() {}"
        );

        let warnings = capture::warnings_during(|| {
          assert_ok!(new_file.validate());
          assert_ok!(marked.validate());
        });
        assert!(warnings.is_empty(), "{:?}", warnings);
    }

    #[test]
    fn every_marker_spelling_is_recognised()
    {   for marker in SPARSE_EDIT_MARKERS
        {   assert!(has_sparse_marker(&format!("x\n{}\ny", marker)));
        }
    }
}
