fn main() {
    println!("cargo:rerun-if-env-changed=FEEDER_WIFI_SSID");
    println!("cargo:rerun-if-env-changed=FEEDER_WIFI_PASSWORD");
    println!("cargo:rerun-if-env-changed=FEEDER_CLOUD_HOST");
    println!("cargo:rerun-if-env-changed=FEEDER_SAS_TOKEN");

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
