//! The job script document handed to the engine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::commands::{Analysis, CmdCalculation, CmdEndSession, CmdListGen, CmdOpen, CmdUser, Command, Design};
use crate::config::EngineConfig;
use crate::errors::StruxResult;
use crate::restricted::UserModule;
use crate::struxml::ToXml;
use crate::xml::XmlElement;

/// Script format version written in the header
pub const FDSCRIPT_VERSION: &str = "2000";

const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const SCHEMA_LOCATION: &str = "fdscript.xsd";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FdScriptHeader {
    pub title: String,
    pub version: String,
    pub module: String,
    pub log_file: PathBuf,
}

impl FdScriptHeader {
    pub fn new(title: impl Into<String>, config: &EngineConfig) -> Self {
        FdScriptHeader {
            title: title.into(),
            version: FDSCRIPT_VERSION.to_string(),
            module: config.module.clone(),
            log_file: PathBuf::from(&config.log_file),
        }
    }
}

impl ToXml for FdScriptHeader {
    fn to_xml(&self) -> StruxResult<XmlElement> {
        Ok(XmlElement::new("fdscriptheader")
            .with_child(XmlElement::new("title").with_text(&self.title))
            .with_child(XmlElement::new("version").with_text(&self.version))
            .with_child(XmlElement::new("module").with_text(&self.module))
            .with_child(XmlElement::new("logfile").with_text(self.log_file.display())))
    }
}

/// Header plus commands, executed by the engine in insertion order
///
/// # Example
///
/// ```rust
/// use std::path::{Path, PathBuf};
/// use strux_core::calculate::{Analysis, FdScript};
/// use strux_core::config::EngineConfig;
///
/// let script = FdScript::analysis(
///     &EngineConfig::default(),
///     Path::new("model.struxml"),
///     Analysis::static_analysis(),
///     None,
///     &[PathBuf::from("reactions.bsc")],
///     Path::new("results"),
///     true,
/// )?;
///
/// assert_eq!(script.commands.len(), 4);
/// assert_eq!(script.expected_outputs(), vec![Path::new("results/reactions.csv")]);
/// # Ok::<(), strux_core::errors::StruxError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FdScript {
    pub header: FdScriptHeader,
    pub commands: Vec<Command>,
}

impl FdScript {
    pub fn new(header: FdScriptHeader) -> Self {
        FdScript {
            header,
            commands: Vec::new(),
        }
    }

    /// Append a command (builder pattern)
    pub fn with_command(mut self, command: impl Into<Command>) -> Self {
        self.commands.push(command.into());
        self
    }

    pub fn push(&mut self, command: impl Into<Command>) {
        self.commands.push(command.into());
    }

    /// Open the model, calculate, then list one result file per template.
    ///
    /// # Errors
    ///
    /// `InvalidScriptExtension` if a template is not a `.bsc` file.
    pub fn analysis(
        config: &EngineConfig,
        model_path: &Path,
        analysis: Analysis,
        design: Option<Design>,
        bsc_paths: &[PathBuf],
        output_dir: &Path,
        end_session: bool,
    ) -> StruxResult<Self> {
        let mut script = FdScript::new(FdScriptHeader::new("analysis", config))
            .with_command(CmdOpen::new(model_path))
            .with_command(CmdCalculation::new(analysis, design));
        script.push_list_gens(bsc_paths, output_dir)?;
        if end_session {
            script.push(CmdEndSession);
        }
        Ok(script)
    }

    /// Open an already calculated model and list its results.
    pub fn list_results(
        config: &EngineConfig,
        model_path: &Path,
        bsc_paths: &[PathBuf],
        output_dir: &Path,
        end_session: bool,
    ) -> StruxResult<Self> {
        let mut script = FdScript::new(FdScriptHeader::new("list results", config))
            .with_command(CmdOpen::new(model_path))
            .with_command(CmdUser::new(UserModule::Resmode));
        script.push_list_gens(bsc_paths, output_dir)?;
        if end_session {
            script.push(CmdEndSession);
        }
        Ok(script)
    }

    fn push_list_gens(&mut self, bsc_paths: &[PathBuf], output_dir: &Path) -> StruxResult<()> {
        for bsc in bsc_paths {
            self.push(CmdListGen::new(bsc, output_dir)?);
        }
        Ok(())
    }

    /// Result files the list commands will write, in command order
    pub fn expected_outputs(&self) -> Vec<&Path> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::ListGen(cmd) => Some(cmd.out_file.as_path()),
                _ => None,
            })
            .collect()
    }

    pub fn to_xml_string(&self) -> StruxResult<String> {
        self.to_xml()?.to_xml_string()
    }
}

impl ToXml for FdScript {
    fn to_xml(&self) -> StruxResult<XmlElement> {
        let mut root = XmlElement::new("fdscript")
            .with_attr("xmlns:xsi", XSI_NAMESPACE)
            .with_attr("xsi:noNamespaceSchemaLocation", SCHEMA_LOCATION)
            .with_child(self.header.to_xml()?);
        for command in &self.commands {
            root.children.push(command.to_xml()?);
        }
        Ok(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_comes_first_and_commands_keep_order() {
        let script = FdScript::list_results(
            &EngineConfig::default(),
            Path::new("m.struxml"),
            &[PathBuf::from("a.bsc"), PathBuf::from("b.bsc")],
            Path::new("out"),
            true,
        )
        .unwrap();
        let e = script.to_xml().unwrap();
        let names: Vec<_> = e.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["fdscriptheader", "cmdopen", "cmduser", "cmdlistgen", "cmdlistgen", "cmdendsession"]
        );
        let header = &e.children[0];
        assert_eq!(header.required_child("module").unwrap().text.as_deref(), Some("SFRAME"));
        assert_eq!(header.required_child("logfile").unwrap().text.as_deref(), Some("logfile.log"));
    }

    #[test]
    fn test_bad_template_fails_the_whole_script() {
        let err = FdScript::analysis(
            &EngineConfig::default(),
            Path::new("m.struxml"),
            Analysis::static_analysis(),
            None,
            &[PathBuf::from("ok.bsc"), PathBuf::from("bad.txt")],
            Path::new("out"),
            false,
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_SCRIPT_EXTENSION");
    }

    #[test]
    fn test_script_text_parses_back() {
        let script = FdScript::new(FdScriptHeader::new("t", &EngineConfig::default()))
            .with_command(CmdOpen::new("m.struxml"))
            .with_command(CmdEndSession);
        let text = script.to_xml_string().unwrap();
        assert!(text.contains("xsi:noNamespaceSchemaLocation=\"fdscript.xsd\""));
        let parsed = XmlElement::parse(&text).unwrap();
        assert_eq!(parsed, script.to_xml().unwrap());
    }
}
