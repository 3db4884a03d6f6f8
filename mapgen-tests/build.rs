fn main() {
    // Generate the Java and XML output the integration tests read back
    // via include_str!; nothing here is compiled into a crate
    let out_dir = std::env::var("OUT_DIR").unwrap();
    mapgen_codegen::CodegenBuilder::new("schema.sql")
        .output_dir(std::path::Path::new(&out_dir).join("generated"))
        .model_package("com.example.model")
        .mapper_package("com.example.mapper")
        .suppress_date()
        .overwrite()
        .generate()
        .expect("codegen failed");

    println!("cargo:rerun-if-changed=schema.sql");
}
