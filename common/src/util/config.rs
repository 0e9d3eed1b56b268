use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub router: RouterConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: InputConfig::default(),
            router: RouterConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_netlist_file")]
    pub netlist_file: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            netlist_file: default_netlist_file(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RouterConfig {
    /// Seed for the neighbour-ordering RNG. Absent = seed from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self { seed: None }
    }
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Optional PNG of the routed layout.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_print_grid")]
    pub print_grid: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            image: None,
            print_grid: default_print_grid(),
        }
    }
}

fn default_netlist_file() -> String {
    "inputs/simple.infile".to_string()
}

fn default_print_grid() -> bool {
    false
}
