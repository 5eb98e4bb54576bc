use std::{
    env,
    ffi::OsString,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use log::{debug, info};

/// Overrides where the NeuralAmpModelerCore checkout lives.
pub const CORE_DIR_ENV: &str = "NAM_CORE_DIR";

const CORE_DIR_NAME: &str = "NeuralAmpModelerCore";
const LOADMODEL: &str = "loadmodel";
const RENDER: &str = "render";

/// Root of this repository, the parent of the `harness` crate.
fn repo_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")))
}

static DISCOVERED: LazyLock<CoreTools> = LazyLock::new(|| {
    let tools = CoreTools::from_env();
    if tools.loadmodel.is_none() || tools.render.is_none() {
        info!(
            "NeuralAmpModelerCore tools incomplete under {}",
            tools.core_dir.display()
        );
    }
    tools
});

/// The core checkout named by `env_value`, or `NeuralAmpModelerCore` next to
/// `repo_root` when it is unset or empty.
fn core_dir_for(env_value: Option<OsString>, repo_root: &Path) -> PathBuf {
    match env_value {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => repo_root
            .parent()
            .unwrap_or(repo_root)
            .join(CORE_DIR_NAME),
    }
}

/// The native tools built from a NeuralAmpModelerCore checkout.
///
/// Executables are looked up under `<core_dir>/build/tools/`. A tool counts as
/// present only if the checkout, its `build` directory and the executable all exist.
#[derive(Debug, Clone)]
pub struct CoreTools {
    core_dir: PathBuf,
    loadmodel: Option<PathBuf>,
    render: Option<PathBuf>,
}

impl CoreTools {
    /// Looks for the core checkout at `core_dir`.
    pub fn at(core_dir: impl Into<PathBuf>) -> Self {
        let core_dir = core_dir.into();
        let loadmodel = find_tool(&core_dir, LOADMODEL);
        let render = find_tool(&core_dir, RENDER);

        debug!(
            core_dir:? = core_dir,
            loadmodel = loadmodel.is_some(),
            render = render.is_some();
            "probed core tools"
        );

        Self {
            core_dir,
            loadmodel,
            render,
        }
    }

    /// Looks for the core checkout named by `NAM_CORE_DIR`, or next to `repo_root`.
    pub fn discover(repo_root: &Path) -> Self {
        Self::at(core_dir_for(env::var_os(CORE_DIR_ENV), repo_root))
    }

    /// Looks for the core checkout relative to this repository.
    pub fn from_env() -> Self {
        Self::discover(&repo_root())
    }

    /// The tools discovered once for the whole process.
    pub fn shared() -> &'static CoreTools {
        &DISCOVERED
    }

    pub fn core_dir(&self) -> &Path {
        &self.core_dir
    }

    /// Path to the `loadmodel` executable, if built.
    pub fn loadmodel(&self) -> Option<&Path> {
        self.loadmodel.as_deref()
    }

    /// Path to the `render` executable, if built.
    pub fn render(&self) -> Option<&Path> {
        self.render.as_deref()
    }
}

fn find_tool(core_dir: &Path, name: &str) -> Option<PathBuf> {
    let build = core_dir.join("build");
    if !core_dir.exists() || !build.exists() {
        return None;
    }

    let exe = build
        .join("tools")
        .join(format!("{name}{}", env::consts::EXE_SUFFIX));
    exe.exists().then_some(exe)
}
