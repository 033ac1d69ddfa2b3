use super::*;
use serial_test::serial;
use tempfile::TempDir;

#[test]
fn default_config() {
    let config = Config::default();
    assert_eq!(config.ollama.protocol, "http");
    assert_eq!(config.ollama.host, "localhost");
    assert_eq!(config.ollama.port, 11434);
    assert_eq!(config.ollama.embedding_model, "nomic-embed-text");
    assert_eq!(config.generation.model, "mistral");
    assert_eq!(config.generation.num_predict, 256);
    assert_eq!(config.generation.num_ctx, 2048);
    assert_eq!(config.generation.top_k, 20);
    assert_eq!(config.generation.keep_alive, "10m");
    assert_eq!(config.retrieval.k, 4);
    assert_eq!(config.retrieval.per_doc_char_limit, 600);
    assert_eq!(config.server.port, 5000);
}

#[test]
fn config_validation() {
    let config = Config::default();
    assert!(config.validate().is_ok());

    let mut invalid_config = config.clone();
    invalid_config.ollama.protocol = "ftp".to_string();
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.ollama.port = 0;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.ollama.embedding_model = String::new();
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.ollama.batch_size = 1001;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.generation.temperature = 2.5;
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidTemperature(_))
    ));

    let mut invalid_config = config.clone();
    invalid_config.generation.top_p = 0.0;
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidTopP(_))
    ));

    let mut invalid_config = config.clone();
    invalid_config.retrieval.k = 0;
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidTopKDocuments(0))
    ));

    let mut invalid_config = config.clone();
    invalid_config.retrieval.endpoint = Some("not a url".to_string());
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidUrl(_))
    ));

    let mut invalid_config = config;
    invalid_config.server.port = 0;
    assert!(invalid_config.validate().is_err());
}

#[test]
fn ollama_url_generation() {
    let config = Config::default();
    let url = config
        .ollama_url()
        .expect("should generate ollama_url successfully");
    assert_eq!(url.as_str(), "http://localhost:11434/");
}

#[test]
fn toml_serialization() {
    let config = Config::default();
    let toml_str = toml::to_string(&config).expect("should serialize toml correctly");
    let parsed_config: Config = toml::from_str(&toml_str).expect("should parse toml correctly");
    assert_eq!(config, parsed_config);
}

#[test]
fn partial_toml_uses_defaults() {
    let partial_toml = r#"
        [generation]
        model = "llama3"

        [retrieval]
        k = 6
    "#;

    let config: Config = toml::from_str(partial_toml).expect("should parse partial toml");
    assert_eq!(config.generation.model, "llama3");
    assert_eq!(config.generation.num_ctx, 2048);
    assert_eq!(config.retrieval.k, 6);
    assert_eq!(config.retrieval.backend, "lancedb");
    assert_eq!(config.ollama, OllamaConfig::default());
}

#[test]
fn setter_validation() {
    let mut config = OllamaConfig::default();

    assert!(config.set_protocol("https".to_string()).is_ok());
    assert!(config.set_host("example.com".to_string()).is_ok());
    assert!(config.set_port(8080).is_ok());
    assert!(config.set_embedding_model("mxbai-embed-large".to_string()).is_ok());
    assert!(config.set_batch_size(128).is_ok());

    assert!(config.set_protocol("ftp".to_string()).is_err());
    assert!(config.set_port(0).is_err());
    assert!(config.set_embedding_model(String::new()).is_err());
    assert!(config.set_batch_size(0).is_err());
    assert!(config.set_batch_size(1001).is_err());

    let mut generation = GenerationConfig::default();
    assert!(generation.set_model("llama3".to_string()).is_ok());
    assert!(generation.set_model("   ".to_string()).is_err());
    assert_eq!(generation.model, "llama3");
}

#[test]
fn load_missing_config() {
    let temp_dir = TempDir::new().expect("should create temp dir");

    let config = Config::load(temp_dir.path()).expect("should fall back to defaults");

    assert_eq!(config.get_base_dir(), temp_dir.path());
    assert_eq!(config.ollama, OllamaConfig::default());
    assert_eq!(config.index_path(), temp_dir.path().join("restaurant_index"));
}

#[test]
fn save_and_reload() {
    let temp_dir = TempDir::new().expect("should create temp dir");

    let mut config = Config::load(temp_dir.path()).expect("should load defaults");
    config.generation.model = "llama3".to_string();
    config.retrieval.backend = "http".to_string();
    config.retrieval.endpoint = Some("http://localhost:9000/search".to_string());
    config.save().expect("should save config");

    assert!(temp_dir.path().join("config.toml").exists());

    let reloaded = Config::load(temp_dir.path()).expect("should reload config");
    assert_eq!(config, reloaded);
}

#[test]
fn load_rejects_invalid_values() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    fs::write(
        temp_dir.path().join("config.toml"),
        "[ollama]\nprotocol = \"ftp\"\n",
    )
    .expect("should write config file");

    assert!(Config::load(temp_dir.path()).is_err());
}

#[test]
fn absolute_index_directory_is_kept() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let mut config = Config::load(temp_dir.path()).expect("should load defaults");
    let absolute = temp_dir.path().join("elsewhere").join("index");
    config.index.directory = absolute.clone();

    assert_eq!(config.index_path(), absolute);
}

#[test]
fn https_url_generation() {
    let mut config = Config::default();
    config.ollama.protocol = "https".to_string();
    config.ollama.host = "secure.example.com".to_string();
    config.ollama.port = 443;

    let url = config
        .ollama_url()
        .expect("should generate https url successfully");
    assert_eq!(url.as_str(), "https://secure.example.com/");
}

#[test]
#[serial]
fn home_env_var_overrides_default_dir() {
    let temp_dir = TempDir::new().expect("temp dir");
    let previous = std::env::var_os(HOME_ENV_VAR);

    // SAFETY: env-mutating tests are serialized and no other thread reads this variable
    unsafe { std::env::set_var(HOME_ENV_VAR, temp_dir.path()) };
    let dir = Config::default_dir();

    // SAFETY: as above
    unsafe {
        match previous {
            Some(value) => std::env::set_var(HOME_ENV_VAR, value),
            None => std::env::remove_var(HOME_ENV_VAR),
        }
    }

    assert_eq!(dir.expect("dir resolves"), temp_dir.path());
}

#[test]
#[serial]
fn empty_home_env_var_is_ignored() {
    let previous = std::env::var_os(HOME_ENV_VAR);

    // SAFETY: env-mutating tests are serialized and no other thread reads this variable
    unsafe { std::env::set_var(HOME_ENV_VAR, "") };
    let dir = Config::default_dir();

    // SAFETY: as above
    unsafe {
        match previous {
            Some(value) => std::env::set_var(HOME_ENV_VAR, value),
            None => std::env::remove_var(HOME_ENV_VAR),
        }
    }

    if let Ok(dir) = dir {
        assert_ne!(dir, PathBuf::new());
    }
}
