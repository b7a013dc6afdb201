#[derive(Debug, Error)]
pub(crate) enum LevelError {
    #[error("read level '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parse level json at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("tile id {0} appears in more than one catalog role")]
    AmbiguousTile(u16),
}

/// Static level collider, materialized once per solid/platform tile.
#[derive(Debug, Clone)]
pub(crate) struct Block {
    pub(crate) id: EntityId,
    pub(crate) bounds: Rect,
    pub(crate) one_way: bool,
    #[allow(dead_code)]
    pub(crate) layer: DrawLayer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum PipeKindDef {
    Normal,
    Grey,
    Gold,
}

impl PipeKindDef {
    pub(crate) fn to_kind(self) -> PipeKind {
        match self {
            PipeKindDef::Normal => PipeKind::Normal,
            PipeKindDef::Grey => PipeKind::Grey,
            PipeKindDef::Gold => PipeKind::Gold,
        }
    }
}

/// Catalog entry for a pipe tile: which neighbor cells its two openings
/// face, in grid steps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub(crate) struct PipeTileDef {
    pub(crate) id: u16,
    pub(crate) kind: PipeKindDef,
    pub(crate) opening_a: [i32; 2],
    pub(crate) opening_b: [i32; 2],
}

/// The single authoritative mapping from tile ids to gameplay roles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct TileCatalog {
    #[serde(default)]
    pub(crate) solid_tiles: Vec<u16>,
    #[serde(default)]
    pub(crate) one_way_tiles: Vec<u16>,
    #[serde(default)]
    pub(crate) pipe_tiles: Vec<PipeTileDef>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum TileRole {
    Solid,
    OneWay,
    Pipe(PipeTileDef),
}

impl TileCatalog {
    pub(crate) fn role_of(&self, tile_id: u16) -> Option<TileRole> {
        if self.solid_tiles.contains(&tile_id) {
            return Some(TileRole::Solid);
        }
        if self.one_way_tiles.contains(&tile_id) {
            return Some(TileRole::OneWay);
        }
        self.pipe_tiles
            .iter()
            .find(|def| def.id == tile_id)
            .copied()
            .map(TileRole::Pipe)
    }

    fn validate(&self) -> Result<(), LevelError> {
        let mut seen = HashSet::new();
        let pipe_ids = self.pipe_tiles.iter().map(|def| def.id);
        for id in self
            .solid_tiles
            .iter()
            .copied()
            .chain(self.one_way_tiles.iter().copied())
            .chain(pipe_ids)
        {
            if !seen.insert(id) {
                return Err(LevelError::AmbiguousTile(id));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub(crate) struct SpawnerDef {
    pub(crate) position: [f32; 2],
    pub(crate) period: f32,
    pub(crate) limit: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct LevelFile {
    pub(crate) name: String,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) tile_size: f32,
    pub(crate) tiles: Vec<u16>,
    pub(crate) catalog: TileCatalog,
    pub(crate) player_spawn: [f32; 2],
    #[serde(default)]
    pub(crate) spawners: Vec<SpawnerDef>,
}

pub(crate) fn parse_level_json(raw: &str) -> Result<LevelFile, LevelError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let level = match serde_path_to_error::deserialize::<_, LevelFile>(&mut deserializer) {
        Ok(level) => level,
        Err(error) => {
            let path = error.path().to_string();
            return Err(LevelError::Parse {
                path,
                source: error.into_inner(),
            });
        }
    };
    level.catalog.validate()?;
    Ok(level)
}

pub(crate) fn load_level_file(path: &Path) -> Result<LevelFile, LevelError> {
    let raw = fs::read_to_string(path).map_err(|source| LevelError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_level_json(&raw)
}
