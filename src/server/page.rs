pub const INDEX_HTML: &str = r##"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Nutri-Coach HF Proxy Space</title>
<style>
  body { font-family: system-ui, sans-serif; max-width: 760px; margin: 2rem auto; padding: 0 1rem; color: #1f2933; }
  .tabs button { padding: .5rem 1rem; border: 1px solid #cbd2d9; background: #f5f7fa; cursor: pointer; }
  .tabs button.active { background: #fff; border-bottom-color: #fff; font-weight: 600; }
  .panel { display: none; border: 1px solid #cbd2d9; padding: 1rem; margin-top: -1px; }
  .panel.active { display: block; }
  textarea { width: 100%; box-sizing: border-box; }
  label { display: block; margin-top: .75rem; }
  input[type=range] { width: 100%; }
  .run { margin-top: 1rem; padding: .5rem 1.25rem; }
  .error { color: #b42318; white-space: pre-wrap; }
  img { max-width: 100%; margin-top: 1rem; }
  #text-output { width: 100%; min-height: 8rem; margin-top: 1rem; }
</style>
</head>
<body>
<h1>Nutri-Coach HF Proxy Space</h1>

<div class="tabs">
  <button type="button" class="active" data-tab="image-panel">Text to Image</button>
  <button type="button" data-tab="text-panel">Text Generation</button>
</div>

<section id="image-panel" class="panel active">
  <textarea id="image-prompt" rows="3" placeholder="A cute red panda chef cooking sushi"></textarea>
  <label>Width <output id="width-value">1024</output>
    <input id="width" type="range" min="256" max="2048" step="64" value="1024"></label>
  <label>Height <output id="height-value">1024</output>
    <input id="height" type="range" min="256" max="2048" step="64" value="1024"></label>
  <label>Guidance scale <output id="guidance-value">7.5</output>
    <input id="guidance" type="range" min="0" max="20" step="0.1" value="7.5"></label>
  <button type="button" class="run" id="image-run">Generate Image</button>
  <div id="image-output"></div>
</section>

<section id="text-panel" class="panel">
  <textarea id="text-prompt" rows="4" placeholder="Explain whether apples are healthy"></textarea>
  <label>Max tokens <output id="tokens-value">150</output>
    <input id="tokens" type="range" min="1" max="1024" step="1" value="150"></label>
  <button type="button" class="run" id="text-run">Generate</button>
  <textarea id="text-output" readonly></textarea>
</section>

<script>
  const $ = (id) => document.getElementById(id);

  document.querySelectorAll(".tabs button").forEach((tab) => {
    tab.addEventListener("click", () => {
      document.querySelectorAll(".tabs button, .panel").forEach((el) => el.classList.remove("active"));
      tab.classList.add("active");
      $(tab.dataset.tab).classList.add("active");
    });
  });

  [["width", "width-value"], ["height", "height-value"], ["guidance", "guidance-value"], ["tokens", "tokens-value"]]
    .forEach(([input, label]) => $(input).addEventListener("input", () => { $(label).textContent = $(input).value; }));

  async function post(url, body) {
    const resp = await fetch(url, {
      method: "POST",
      headers: { "Content-Type": "application/json" },
      body: JSON.stringify(body),
    });
    if (!resp.ok) {
      return { status: "error", message: "Request failed with HTTP " + resp.status };
    }
    return resp.json();
  }

  $("image-run").addEventListener("click", async () => {
    const out = $("image-output");
    const button = $("image-run");
    button.disabled = true;
    out.textContent = "Generating…";
    try {
      const result = await post("/api/text-to-image", {
        prompt: $("image-prompt").value,
        width: Number($("width").value),
        height: Number($("height").value),
        guidance_scale: Number($("guidance").value),
      });
      out.textContent = "";
      if (result.status === "ok") {
        const img = document.createElement("img");
        img.src = result.image;
        img.alt = $("image-prompt").value;
        out.appendChild(img);
      } else {
        const p = document.createElement("p");
        p.className = "error";
        p.textContent = result.message;
        out.appendChild(p);
      }
    } catch (err) {
      out.textContent = "Error generating image: " + err;
    } finally {
      button.disabled = false;
    }
  });

  $("text-run").addEventListener("click", async () => {
    const out = $("text-output");
    const button = $("text-run");
    button.disabled = true;
    out.value = "Generating…";
    try {
      const result = await post("/api/text-generation", {
        prompt: $("text-prompt").value,
        max_tokens: Number($("tokens").value),
      });
      out.value = result.status === "ok" ? result.text : result.message;
    } catch (err) {
      out.value = "Error generating text: " + err;
    } finally {
      button.disabled = false;
    }
  });
</script>
</body>
</html>
"##;
