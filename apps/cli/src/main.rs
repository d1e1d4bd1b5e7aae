//! Terminal shell for the vacuum-robot control panel.
//!
//! Drives the panel over a real serial port, or over the built-in simulator
//! with `--sim` when no hardware is around:
//!
//! ```text
//! vaclink [--sim] [PORT]
//! ```
//!
//! Commands are read one line at a time: the single-character command
//! alphabet (w/a/s/d/p/i/o), plus `connect`, `disconnect`, `speed N`,
//! `status`, `wall`, and `quit`.

use futures::stream::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};

use vaclink_client::mock::MockEnvironment;
use vaclink_client::{SerialEnvironment, SerialLinkClient};
use vaclink_panel::{ControlPanel, Notifier, PanelConfig};
use vaclink_transport_native::NativeSerialEnvironment;

/// Toast analog for a terminal: one line per notification
struct PrintNotifier;

impl Notifier for PrintNotifier {
    fn notify(&self, title: &str, body: &str) {
        if body.is_empty() {
            println!("*** {}", title);
        } else {
            println!("*** {}: {}", title, body);
        }
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    let config = PanelConfig::from_env();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let simulate = args.iter().any(|a| a == "--sim");
    let port_arg = args.iter().find(|a| !a.starts_with("--")).cloned();

    if simulate {
        println!("Driving the built-in simulated robot (no hardware)");
        let client = SerialLinkClient::new(MockEnvironment::new());
        run(ControlPanel::new(client, PrintNotifier, config)).await
    } else {
        let port = port_arg
            .or_else(|| config.serial_port.clone())
            .or_else(|| NativeSerialEnvironment::discover().into_iter().next());

        let env = match port {
            Some(path) => {
                println!("Using serial port {}", path);
                NativeSerialEnvironment::new(path)
            }
            None => {
                println!("No serial port found; `connect` will fail until one is configured");
                NativeSerialEnvironment::unconfigured()
            }
        };

        let client = SerialLinkClient::new(env);
        run(ControlPanel::new(client, PrintNotifier, config)).await
    }
}

async fn run<E: SerialEnvironment>(
    mut panel: ControlPanel<E, PrintNotifier>,
) -> std::io::Result<()> {
    println!("Camera feed: {}", panel.video_feed_url());
    println!("Link: {}", panel.status_line());
    print_help();

    // Status changes land here from the client's subscriber mechanism
    let (subscription, mut statuses) = panel.client().status_stream();
    let printer = tokio::spawn(async move {
        while let Some(status) = statuses.next().await {
            println!("[link] {}", status.status_text());
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        match input {
            "" => {}
            "quit" | "exit" => break,
            "help" => print_help(),
            "connect" => {
                // Failures already reach the user through the notifier
                let _ = panel.connect().await;
            }
            "disconnect" => panel.disconnect().await,
            "status" => println!("Link: {}", panel.status_line()),
            "wall" => {
                panel.simulate_wall_detection();
                match panel.warning_text() {
                    Some(text) => println!("!!! {}", text),
                    None => println!("Wall warning cleared"),
                }
            }
            _ => {
                if let Some(rest) = input.strip_prefix("speed ") {
                    match rest.trim().parse::<u8>() {
                        Ok(value) => {
                            panel.set_speed(value);
                            println!("Speed: {}%", panel.speed());
                        }
                        Err(_) => println!("Speed must be 0-100"),
                    }
                } else if input.len() == 1 {
                    if let Some(key) = input.chars().next() {
                        panel.handle_key(key).await;
                    }
                } else {
                    println!("Unknown command; try `help`");
                }
            }
        }
    }

    panel.disconnect().await;
    subscription.cancel();
    printer.abort();
    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  connect / disconnect   manage the serial link");
    println!("  w a s d                drive; p stops the motors");
    println!("  i / o                  suction on / off");
    println!("  speed <0-100>          set the speed indicator");
    println!("  wall                   toggle the simulated wall warning");
    println!("  status / help / quit");
}
