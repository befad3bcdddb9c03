use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Scalar shader parameters exposed for live tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShaderParam {
    SampleRadius,
    Beta,
    Eps,
    Sigma,
}

impl ShaderParam {
    pub const ALL: [ShaderParam; 4] = [Self::SampleRadius, Self::Beta, Self::Eps, Self::Sigma];

    /// Name used in labels and logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::SampleRadius => "SampleRadius",
            Self::Beta => "Beta",
            Self::Eps => "Eps",
            Self::Sigma => "Sigma",
        }
    }

    /// Slot in the packed uniform vector.
    pub fn index(self) -> usize {
        match self {
            Self::SampleRadius => 0,
            Self::Beta => 1,
            Self::Eps => 2,
            Self::Sigma => 3,
        }
    }
}

impl fmt::Display for ShaderParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown shader parameter: {0}")]
pub struct UnknownShaderParam(pub String);

impl FromStr for ShaderParam {
    type Err = UnknownShaderParam;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "sampleradius" | "radius" => Ok(Self::SampleRadius),
            "beta" => Ok(Self::Beta),
            "eps" | "epsilon" => Ok(Self::Eps),
            "sigma" => Ok(Self::Sigma),
            _ => Err(UnknownShaderParam(s.to_string())),
        }
    }
}

/// The renderer's table of named scalar shader parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShaderParameters {
    values: BTreeMap<ShaderParam, f32>,
}

impl ShaderParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, param: ShaderParam, value: f32) {
        self.values.insert(param, value);
    }

    pub fn get(&self, param: ShaderParam) -> Option<f32> {
        self.values.get(&param).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ShaderParam, f32)> + '_ {
        self.values.iter().map(|(p, v)| (*p, *v))
    }

    /// Values packed for a uniform buffer. Unset parameters read as zero.
    pub fn to_array(&self) -> [f32; 4] {
        let mut out = [0.0; 4];
        for (param, value) in self.iter() {
            out[param.index()] = value;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_common_spellings() {
        assert_eq!("sample-radius".parse::<ShaderParam>().unwrap(), ShaderParam::SampleRadius);
        assert_eq!("SampleRadius".parse::<ShaderParam>().unwrap(), ShaderParam::SampleRadius);
        assert_eq!("epsilon".parse::<ShaderParam>().unwrap(), ShaderParam::Eps);
        assert!("gamma".parse::<ShaderParam>().is_err());
    }

    #[test]
    fn packed_array_follows_index() {
        let mut p = ShaderParameters::new();
        p.set(ShaderParam::Sigma, 0.09);
        p.set(ShaderParam::SampleRadius, 1.0);
        assert_eq!(p.to_array(), [1.0, 0.0, 0.0, 0.09]);
    }

    #[test]
    fn set_overwrites() {
        let mut p = ShaderParameters::new();
        p.set(ShaderParam::Beta, 0.005);
        p.set(ShaderParam::Beta, -0.005);
        assert_eq!(p.get(ShaderParam::Beta), Some(-0.005));
        assert_eq!(p.get(ShaderParam::Eps), None);
    }
}
