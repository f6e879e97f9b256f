use kiln_bundler::{Builder, dev};

use super::common::{ProjectArgs, fail, load_plan};

pub struct ServeArgs {
    pub project: ProjectArgs,
    pub port: Option<u16>,
    pub write_to_disk: Option<bool>,
}

pub fn run(args: ServeArgs) {
    let plan = load_plan(&args.project, |config| {
        if let Some(port) = args.port {
            config.dev_server.port = port;
        }
        if let Some(write) = args.write_to_disk {
            config.dev_server.write_to_disk = write;
        }
    });
    let address = plan.dev_server.address();

    let builder = Builder::new(plan).unwrap_or_else(|e| fail(e));
    println!("serving on http://{}", address);
    if let Err(e) = dev::serve(&builder) {
        fail(e);
    }
}
