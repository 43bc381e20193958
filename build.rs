use chrono::Utc;

fn main() {
    // Version string baked into the firmware banner.
    let build_version = Utc::now().format("%Y%m%d-%H%M%S").to_string();
    println!("cargo:rustc-env=BUILD_VERSION={build_version}");
}
