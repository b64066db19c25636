use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("audito")
        .version("0.1.0")
        .author("Audito Contributors")
        .about("Turn paginated web articles into audio")
        .arg(clap::arg!(<URL> "First page of the article to read"))
        .arg(
            clap::arg!(-o --output_dir <DIR> "Directory the MP3 artifact is written to")
                .value_name("DIR")
                .default_value(".")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(-t --text "Print the assembled article text instead of synthesizing"))
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds for page fetches").default_value("30"))
        .arg(clap::arg!(--user_agent <UA> "Custom User-Agent for page fetches").value_name("UA"))
        .arg(clap::arg!(--endpoint <URL> "Synthesis backend endpoint").value_name("URL"))
        .arg(clap::arg!(--segment_len <CHARS> "Segment length in characters").default_value("500"))
        .arg(clap::arg!(--speed <NUM> "Speech speed").default_value("10"))
        .arg(clap::arg!(--voice <NUM> "Voice id").default_value("5118"))
        .arg(clap::arg!(--volume <NUM> "Volume").default_value("8"))
        .arg(clap::arg!(-v --verbose "Enable progress output"))
        .arg(
            clap::arg!(--completions <SHELL> "Generate shell completion script")
                .value_name("SHELL")
                .value_parser(["bash", "zsh", "fish", "powershell"]),
        );

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "audito", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "audito", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "audito", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "audito", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
