//! Commands of a job script, one type per command element.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{StruxError, StruxResult};
use crate::restricted::UserModule;
use crate::struxml::ToXml;
use crate::xml::XmlElement;

/// Extension a result-list template must carry
pub const BSC_EXTENSION: &str = "bsc";

fn flag(value: bool) -> u8 {
    u8::from(value)
}

fn path_text(path: &Path) -> String {
    path.display().to_string()
}

// ============================================================================
// Session commands
// ============================================================================

/// Open a model document in the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CmdOpen {
    pub filename: PathBuf,
}

impl CmdOpen {
    pub const COMMAND: &'static str = "; CXL CS2SHELL OPEN";

    pub fn new(filename: impl Into<PathBuf>) -> Self {
        CmdOpen {
            filename: filename.into(),
        }
    }
}

impl ToXml for CmdOpen {
    fn to_xml(&self) -> StruxResult<XmlElement> {
        Ok(XmlElement::new("cmdopen")
            .with_attr("command", Self::COMMAND)
            .with_child(XmlElement::new("filename").with_text(path_text(&self.filename))))
    }
}

/// Switch the engine to a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmdUser {
    pub module: UserModule,
}

impl CmdUser {
    pub fn new(module: UserModule) -> Self {
        CmdUser { module }
    }

    pub fn command(&self) -> String {
        format!("; CXL $MODULE {}", self.module)
    }
}

impl ToXml for CmdUser {
    fn to_xml(&self) -> StruxResult<XmlElement> {
        Ok(XmlElement::new("cmduser").with_attr("command", self.command()))
    }
}

/// Save the open model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CmdSave {
    pub filename: PathBuf,
}

impl CmdSave {
    pub const COMMAND: &'static str = "; CXL CS2SHELL SAVE";

    pub fn new(filename: impl Into<PathBuf>) -> Self {
        CmdSave {
            filename: filename.into(),
        }
    }
}

impl ToXml for CmdSave {
    fn to_xml(&self) -> StruxResult<XmlElement> {
        Ok(XmlElement::new("cmdsave")
            .with_attr("command", Self::COMMAND)
            .with_child(XmlElement::new("filename").with_text(path_text(&self.filename))))
    }
}

/// Close the engine when the script is done
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CmdEndSession;

impl ToXml for CmdEndSession {
    fn to_xml(&self) -> StruxResult<XmlElement> {
        Ok(XmlElement::new("cmdendsession"))
    }
}

// ============================================================================
// Calculation
// ============================================================================

/// Which analyses to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Analysis {
    /// Load cases
    pub calc_case: bool,
    /// Construction stages
    pub calc_cstage: bool,
    /// Imperfections
    pub calc_imperf: bool,
    /// Load combinations
    pub calc_comb: bool,
    /// Maximum of load groups
    pub calc_gmax: bool,
    /// Stability
    pub calc_stab: bool,
    /// Eigenfrequencies
    pub calc_freq: bool,
    /// Seismic
    pub calc_seis: bool,
    pub calc_footfall: bool,
    pub calc_moving_load: bool,
    /// Design calculation after analysis
    pub calc_design: bool,
    /// Finer element division
    pub elem_fine: bool,
    pub diaphragm: bool,
    pub peak_smoothing: bool,
}

impl Analysis {
    /// Static analysis of load cases only
    pub fn static_analysis() -> Self {
        Analysis {
            calc_case: true,
            ..Analysis::default()
        }
    }

    /// Load cases and load combinations
    pub fn with_combinations() -> Self {
        Analysis {
            calc_case: true,
            calc_comb: true,
            ..Analysis::default()
        }
    }

    fn attributes(&self) -> [(&'static str, bool); 14] {
        [
            ("calcCase", self.calc_case),
            ("calcCstage", self.calc_cstage),
            ("calcImpf", self.calc_imperf),
            ("calcComb", self.calc_comb),
            ("calcGmax", self.calc_gmax),
            ("calcStab", self.calc_stab),
            ("calcFreq", self.calc_freq),
            ("calcSeis", self.calc_seis),
            ("calcFootfall", self.calc_footfall),
            ("calcMovingLoad", self.calc_moving_load),
            ("calcDesign", self.calc_design),
            ("elemfine", self.elem_fine),
            ("diaphragm", self.diaphragm),
            ("peaksm", self.peak_smoothing),
        ]
    }
}

impl ToXml for Analysis {
    fn to_xml(&self) -> StruxResult<XmlElement> {
        Ok(self
            .attributes()
            .iter()
            .fold(XmlElement::new("analysis"), |e, (key, value)| e.with_attr(*key, flag(*value))))
    }
}

/// Design step run after the analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Design {
    /// Let the engine pick members
    pub auto_design: bool,
    /// Check utilization of the current members
    pub check: bool,
}

impl ToXml for Design {
    fn to_xml(&self) -> StruxResult<XmlElement> {
        Ok(XmlElement::new("design")
            .with_attr("autodesign", flag(self.auto_design))
            .with_attr("check", flag(self.check)))
    }
}

/// Run the analysis and optionally a design step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmdCalculation {
    pub analysis: Analysis,
    pub design: Option<Design>,
}

impl CmdCalculation {
    pub const COMMAND: &'static str = "; CXL $MODULE CALC";

    pub fn new(analysis: Analysis, design: Option<Design>) -> Self {
        CmdCalculation { analysis, design }
    }
}

impl ToXml for CmdCalculation {
    fn to_xml(&self) -> StruxResult<XmlElement> {
        let mut e = XmlElement::new("cmdcalculation")
            .with_attr("command", Self::COMMAND)
            .with_child(self.analysis.to_xml()?);
        if let Some(design) = &self.design {
            e.children.push(design.to_xml()?);
        }
        Ok(e)
    }
}

// ============================================================================
// Result lists
// ============================================================================

/// Text font of a generated list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub name: String,
    /// Character set, e.g. `ANSI_CHARSET`
    pub charset: String,
    /// Character height (m)
    pub size: f64,
    /// Width factor
    pub width: f64,
    /// Slant angle
    pub slant: f64,
}

impl Default for Font {
    fn default() -> Self {
        Font {
            name: "Tahoma".to_string(),
            charset: "ANSI_CHARSET".to_string(),
            size: 0.003,
            width: 1.0,
            slant: 0.0,
        }
    }
}

impl Font {
    /// # Errors
    ///
    /// `InvalidInput` for an empty name or a size or width that is not positive.
    pub fn new(name: impl Into<String>, size: f64, width: f64) -> StruxResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(StruxError::invalid_input("font.name", name, "must not be empty"));
        }
        for (field, value) in [("font.size", size), ("font.width", width)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(StruxError::invalid_input(field, value.to_string(), "must be positive"));
            }
        }
        Ok(Font {
            name,
            size,
            width,
            ..Font::default()
        })
    }
}

impl ToXml for Font {
    fn to_xml(&self) -> StruxResult<XmlElement> {
        Ok(XmlElement::new("font")
            .with_child(XmlElement::new("name").with_text(&self.name))
            .with_child(XmlElement::new("type").with_text(&self.charset))
            .with_child(XmlElement::new("size").with_text(self.size.to_string()))
            .with_child(XmlElement::new("width").with_text(self.width.to_string()))
            .with_child(XmlElement::new("slant").with_text(self.slant.to_string())))
    }
}

/// Generate a result list from a `.bsc` template into `<output_dir>/<stem>.csv`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CmdListGen {
    pub bsc_file: PathBuf,
    pub out_file: PathBuf,
    pub regional: bool,
    pub fill_cells: bool,
    pub font: Option<Font>,
}

impl CmdListGen {
    pub const COMMAND: &'static str = "$ MODULECOM LISTGEN";

    /// # Errors
    ///
    /// `InvalidScriptExtension` unless `bsc_path` ends in exactly `.bsc`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::path::Path;
    /// use strux_core::calculate::CmdListGen;
    ///
    /// let cmd = CmdListGen::new(Path::new("lists/reactions.bsc"), Path::new("out"))?;
    /// assert_eq!(cmd.out_file, Path::new("out/reactions.csv"));
    ///
    /// assert!(CmdListGen::new(Path::new("reactions.BSC"), Path::new("out")).is_err());
    /// # Ok::<(), strux_core::errors::StruxError>(())
    /// ```
    pub fn new(bsc_path: &Path, output_dir: &Path) -> StruxResult<Self> {
        let stem = match (bsc_path.extension().and_then(|e| e.to_str()), bsc_path.file_stem()) {
            (Some(BSC_EXTENSION), Some(stem)) => stem,
            _ => {
                return Err(StruxError::InvalidScriptExtension {
                    path: path_text(bsc_path),
                    expected: BSC_EXTENSION.to_string(),
                })
            }
        };
        let mut out_file = output_dir.join(stem);
        out_file.set_extension("csv");
        Ok(CmdListGen {
            bsc_file: bsc_path.to_path_buf(),
            out_file,
            regional: false,
            fill_cells: false,
            font: None,
        })
    }

    /// Set the list font
    pub fn with_font(mut self, font: Font) -> Self {
        self.font = Some(font);
        self
    }
}

impl ToXml for CmdListGen {
    fn to_xml(&self) -> StruxResult<XmlElement> {
        let mut e = XmlElement::new("cmdlistgen")
            .with_attr("command", Self::COMMAND)
            .with_attr("bscfile", path_text(&self.bsc_file))
            .with_attr("outfile", path_text(&self.out_file))
            .with_attr("regional", flag(self.regional))
            .with_attr("fillcells", flag(self.fill_cells));
        if let Some(font) = &self.font {
            e.children.push(font.to_xml()?);
        }
        Ok(e)
    }
}

// ============================================================================
// Command list
// ============================================================================

/// Any command a job script can hold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Open(CmdOpen),
    User(CmdUser),
    Calculation(CmdCalculation),
    ListGen(CmdListGen),
    Save(CmdSave),
    EndSession(CmdEndSession),
}

impl ToXml for Command {
    fn to_xml(&self) -> StruxResult<XmlElement> {
        match self {
            Command::Open(cmd) => cmd.to_xml(),
            Command::User(cmd) => cmd.to_xml(),
            Command::Calculation(cmd) => cmd.to_xml(),
            Command::ListGen(cmd) => cmd.to_xml(),
            Command::Save(cmd) => cmd.to_xml(),
            Command::EndSession(cmd) => cmd.to_xml(),
        }
    }
}

macro_rules! command_from {
    ($($variant:ident($ty:ty)),+ $(,)?) => {
        $(impl From<$ty> for Command {
            fn from(cmd: $ty) -> Self {
                Command::$variant(cmd)
            }
        })+
    };
}

command_from!(
    Open(CmdOpen),
    User(CmdUser),
    Calculation(CmdCalculation),
    ListGen(CmdListGen),
    Save(CmdSave),
    EndSession(CmdEndSession),
);
